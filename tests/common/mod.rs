//! In-process fake of the back-office API, served by axum on a free port.
//!
//! Sessions are two cookies, `accessToken` and `refreshToken`. A missing
//! or unknown access token is 401; an expired one is 403, which is what the
//! client treats as "renew and replay".

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use shop_admin::config::AppConfig;
use shop_admin::http::SessionJar;
use shop_admin::AppContext;

pub const ADMIN: (&str, &str) = ("admin@shop.test", "admin123");
pub const EDITOR: (&str, &str) = ("editor@shop.test", "editor123");
pub const VIEWER: (&str, &str) = ("viewer@shop.test", "viewer123");

#[derive(Clone)]
struct Account {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: String,
}

impl Account {
    fn identity(&self) -> Value {
        json!({ "id": self.id, "username": self.username, "email": self.email, "role": self.role })
    }

    fn row(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "role": self.role,
            "created_at": "2024-01-02T09:00:00Z",
        })
    }
}

struct Data {
    next_id: i64,
    accounts: Vec<Account>,
    customers: Vec<Value>,
    categories: Vec<(i64, String)>,
    products: Vec<Value>,
    orders: Vec<Value>,
    /// access token -> (account id, expired)
    access: HashMap<String, (i64, bool)>,
    refresh: HashMap<String, i64>,
    log: Vec<String>,
}

pub struct Backend {
    data: Mutex<Data>,
    token_seq: AtomicU64,
    refresh_calls: AtomicUsize,
    fail_refresh: AtomicBool,
    fail_logout: AtomicBool,
    fail_charts: AtomicBool,
}

type Shared = Arc<Backend>;

fn seed() -> Data {
    let account = |id: i64, username: &str, (email, password): (&str, &str), role: &str| Account {
        id,
        username: username.into(),
        email: email.into(),
        password: password.into(),
        role: role.into(),
    };
    Data {
        next_id: 100,
        accounts: vec![
            account(1, "alice", ADMIN, "admin"),
            account(2, "eddie", EDITOR, "editor"),
            account(3, "vera", VIEWER, "viewer"),
        ],
        customers: vec![
            json!({ "id": 10, "name": "Ada Shop", "email": "ada@cust.test", "phone": "555-0100", "created_at": "2024-02-01T10:00:00Z" }),
            json!({ "id": 11, "name": "Bo Market", "email": "bo@cust.test", "phone": null, "created_at": "2024-02-03T10:00:00Z" }),
        ],
        categories: vec![(1, "Mugs".into()), (2, "Shirts".into())],
        products: vec![
            json!({ "id": 20, "name": "Blue Mug", "price": "12.50", "category": "Mugs", "category_id": 1, "image_url": null }),
            json!({ "id": 21, "name": "Logo Shirt", "price": "25.00", "category": "Shirts", "category_id": 2, "image_url": "/uploads/shirt.png" }),
        ],
        orders: (1..=7)
            .map(|n| {
                let (customer_id, name, email) = if n % 2 == 0 {
                    (11, "Bo Market", "bo@cust.test")
                } else {
                    (10, "Ada Shop", "ada@cust.test")
                };
                json!({
                    "order_id": 30 + n,
                    "customer_id": customer_id,
                    "customer_name": name,
                    "customer_email": email,
                    "status": if n < 4 { "delivered" } else { "pending" },
                    "created_at": format!("2024-03-{:02}T12:00:00Z", n),
                })
            })
            .collect(),
        access: HashMap::new(),
        refresh: HashMap::new(),
        log: Vec::new(),
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn matches_search(record: &Value, keys: &[&str], search: Option<&String>) -> bool {
    let Some(search) = search else { return true };
    let needle = search.to_lowercase();
    keys.iter().any(|key| {
        record[*key]
            .as_str()
            .map_or(false, |v| v.to_lowercase().contains(&needle))
    })
}

impl Backend {
    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap()
    }

    fn issue(&self, data: &mut Data, account_id: i64) -> (String, String) {
        let n = self.token_seq.fetch_add(1, Ordering::SeqCst);
        let access = format!("access-{}", n);
        let refresh = format!("refresh-{}", n);
        data.access.insert(access.clone(), (account_id, false));
        data.refresh.insert(refresh.clone(), account_id);
        (access, refresh)
    }

    /// Resolve the caller, checking the role when a list is given.
    fn authorize(&self, headers: &HeaderMap, roles: &[&str]) -> Result<Account, Response> {
        let data = self.lock();
        let Some(token) = cookie(headers, "accessToken") else {
            return Err(reply(StatusCode::UNAUTHORIZED, json!({ "error": "Access denied. No token provided." })));
        };
        let Some(&(account_id, expired)) = data.access.get(&token) else {
            return Err(reply(StatusCode::UNAUTHORIZED, json!({ "error": "Invalid token" })));
        };
        if expired {
            return Err(reply(StatusCode::FORBIDDEN, json!({ "error": "Invalid or expired token" })));
        }
        let account = data
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| reply(StatusCode::UNAUTHORIZED, json!({ "error": "Unknown user" })))?;
        if !roles.is_empty() && !roles.contains(&account.role.as_str()) {
            return Err(reply(StatusCode::FORBIDDEN, json!({ "error": "Insufficient permissions" })));
        }
        Ok(account)
    }

    // Test controls

    /// Mark every issued access token as expired.
    pub fn expire_sessions(&self) {
        for entry in self.lock().access.values_mut() {
            entry.1 = true;
        }
    }

    pub fn set_refresh_failing(&self, failing: bool) {
        self.fail_refresh.store(failing, Ordering::SeqCst);
    }

    pub fn set_logout_failing(&self, failing: bool) {
        self.fail_logout.store(failing, Ordering::SeqCst);
    }

    pub fn set_charts_failing(&self, failing: bool) {
        self.fail_charts.store(failing, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// "METHOD /api/path?query" for every request served.
    pub fn requests(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().log.clear();
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lock().log.iter().filter(|r| r.starts_with(prefix)).count()
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn product(&self, id: i64) -> Option<Value> {
        self.lock().products.iter().find(|p| p["id"] == id).cloned()
    }
}

async fn record(State(backend): State<Shared>, req: Request, next: Next) -> Response {
    let line = format!("{} {}", req.method(), req.uri());
    backend.lock().log.push(line);
    next.run(req).await
}

// Auth

async fn login(State(b): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let mut data = b.lock();
    let Some(account) = data
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
        .cloned()
    else {
        return reply(StatusCode::UNAUTHORIZED, json!({ "error": "Invalid credentials" }));
    };
    let (access, refresh) = b.issue(&mut data, account.id);
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, format!("accessToken={}; Path=/; HttpOnly", access)),
            (SET_COOKIE, format!("refreshToken={}; Path=/; HttpOnly", refresh)),
        ]),
        Json(json!({ "message": "Logged in", "user": account.identity() })),
    )
        .into_response()
}

async fn register(State(b): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = b.lock();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if data.accounts.iter().any(|a| a.email == email) {
        return reply(StatusCode::CONFLICT, json!({ "error": "Email already registered" }));
    }
    data.next_id += 1;
    let account = Account {
        id: data.next_id,
        username: body["username"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        role: "viewer".into(),
    };
    data.accounts.push(account);
    reply(StatusCode::CREATED, json!({ "message": "User registered" }))
}

async fn refresh(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if b.fail_refresh.load(Ordering::SeqCst) {
        return reply(StatusCode::UNAUTHORIZED, json!({ "error": "Refresh token expired" }));
    }
    let mut data = b.lock();
    let Some(account_id) = cookie(&headers, "refreshToken").and_then(|t| data.refresh.get(&t).copied())
    else {
        return reply(StatusCode::UNAUTHORIZED, json!({ "error": "No refresh token" }));
    };
    let (access, _) = b.issue(&mut data, account_id);
    (
        StatusCode::OK,
        [(SET_COOKIE, format!("accessToken={}; Path=/; HttpOnly", access))],
        Json(json!({ "message": "Token refreshed" })),
    )
        .into_response()
}

async fn logout(State(b): State<Shared>) -> Response {
    if b.fail_logout.load(Ordering::SeqCst) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Logout failed" }));
    }
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, "accessToken=; Path=/; Max-Age=0".to_string()),
            (SET_COOKIE, "refreshToken=; Path=/; Max-Age=0".to_string()),
        ]),
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn profile(State(b): State<Shared>, headers: HeaderMap) -> Response {
    match b.authorize(&headers, &[]) {
        Ok(account) => reply(StatusCode::OK, account.identity()),
        Err(denied) => denied,
    }
}

// Users (admin)

async fn list_users(
    State(b): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    let rows: Vec<Value> = b
        .lock()
        .accounts
        .iter()
        .map(Account::row)
        .filter(|u| matches_search(u, &["username", "email"], q.get("search")))
        .filter(|u| q.get("role").map_or(true, |r| u["role"] == r.as_str()))
        .collect();
    reply(StatusCode::OK, json!(rows))
}

async fn create_user(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    let mut data = b.lock();
    data.next_id += 1;
    let account = Account {
        id: data.next_id,
        username: body["username"].as_str().unwrap_or_default().into(),
        email: body["email"].as_str().unwrap_or_default().into(),
        password: body["password"].as_str().unwrap_or_default().into(),
        role: body["role"].as_str().unwrap_or("viewer").into(),
    };
    let row = account.row();
    data.accounts.push(account);
    reply(StatusCode::CREATED, row)
}

async fn update_user(
    State(b): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    let mut data = b.lock();
    let Some(account) = data.accounts.iter_mut().find(|a| a.id == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "error": "User not found" }));
    };
    for (field, target) in [
        ("username", &mut account.username),
        ("email", &mut account.email),
        ("role", &mut account.role),
    ] {
        if let Some(value) = body[field].as_str() {
            *target = value.to_string();
        }
    }
    reply(StatusCode::OK, account.row())
}

async fn delete_user(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    b.lock().accounts.retain(|a| a.id != id);
    reply(StatusCode::OK, json!({ "message": "User deleted" }))
}

// Customers (admin, editor; delete admin)

async fn list_customers(
    State(b): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &[]) {
        return denied;
    }
    let rows: Vec<Value> = b
        .lock()
        .customers
        .iter()
        .filter(|c| matches_search(c, &["name", "email"], q.get("search")))
        .cloned()
        .collect();
    reply(StatusCode::OK, json!(rows))
}

async fn create_customer(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let mut data = b.lock();
    data.next_id += 1;
    let row = json!({
        "id": data.next_id,
        "name": body["name"],
        "email": body["email"],
        "phone": body["phone"],
        "created_at": "2024-04-01T08:00:00Z",
    });
    data.customers.push(row.clone());
    reply(StatusCode::CREATED, row)
}

async fn update_customer(
    State(b): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let mut data = b.lock();
    let Some(row) = data.customers.iter_mut().find(|c| c["id"] == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "error": "Customer not found" }));
    };
    for field in ["name", "email", "phone"] {
        if !body[field].is_null() {
            row[field] = body[field].clone();
        }
    }
    reply(StatusCode::OK, row.clone())
}

async fn delete_customer(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    b.lock().customers.retain(|c| c["id"] != id);
    reply(StatusCode::OK, json!({ "message": "Customer deleted" }))
}

// Products (multipart writes)

async fn list_categories(State(b): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = b.authorize(&headers, &[]) {
        return denied;
    }
    let rows: Vec<Value> = b
        .lock()
        .categories
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    reply(StatusCode::OK, json!(rows))
}

async fn list_products(
    State(b): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &[]) {
        return denied;
    }
    let rows: Vec<Value> = b
        .lock()
        .products
        .iter()
        .filter(|p| matches_search(p, &["name"], q.get("search")))
        .filter(|p| {
            q.get("category")
                .map_or(true, |c| p["category_id"].to_string() == *c)
        })
        .cloned()
        .collect();
    reply(StatusCode::OK, json!(rows))
}

async fn read_form(mut multipart: Multipart) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name().map(str::to_string) {
            let bytes = field.bytes().await.unwrap();
            fields.insert(name, json!({ "file_name": file_name, "size": bytes.len() }));
        } else {
            fields.insert(name, Value::String(field.text().await.unwrap()));
        }
    }
    fields
}

fn apply_product(data: &Data, row: &mut Value, form: &HashMap<String, Value>) {
    if let Some(name) = form.get("name") {
        row["name"] = name.clone();
    }
    if let Some(price) = form.get("price") {
        row["price"] = price.clone();
    }
    if let Some(category_id) = form.get("category_id").and_then(|v| v.as_str()?.parse::<i64>().ok()) {
        row["category_id"] = json!(category_id);
        row["category"] = data
            .categories
            .iter()
            .find(|(id, _)| *id == category_id)
            .map_or(Value::Null, |(_, name)| json!(name));
    }
    if let Some(image) = form.get("image") {
        row["image_url"] = json!(format!("/uploads/{}", image["file_name"].as_str().unwrap_or("image")));
    }
}

async fn create_product(State(b): State<Shared>, headers: HeaderMap, multipart: Multipart) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let form = read_form(multipart).await;
    let mut data = b.lock();
    data.next_id += 1;
    let mut row = json!({ "id": data.next_id, "image_url": null });
    apply_product(&data, &mut row, &form);
    data.products.push(row.clone());
    reply(StatusCode::CREATED, row)
}

async fn update_product(
    State(b): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let form = read_form(multipart).await;
    let mut data = b.lock();
    let Some(index) = data.products.iter().position(|p| p["id"] == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "error": "Product not found" }));
    };
    let mut row = data.products[index].clone();
    apply_product(&data, &mut row, &form);
    data.products[index] = row.clone();
    reply(StatusCode::OK, row)
}

async fn delete_product(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    b.lock().products.retain(|p| p["id"] != id);
    reply(StatusCode::OK, json!({ "message": "Product deleted" }))
}

// Orders

async fn list_orders(
    State(b): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &[]) {
        return denied;
    }
    let rows: Vec<Value> = b
        .lock()
        .orders
        .iter()
        .filter(|o| matches_search(o, &["customer_name", "customer_email"], q.get("search")))
        .filter(|o| q.get("status").map_or(true, |s| o["status"] == s.as_str()))
        .cloned()
        .collect();
    reply(StatusCode::OK, json!(rows))
}

fn customer_fields(data: &Data, customer_id: &Value) -> (Value, Value) {
    data.customers
        .iter()
        .find(|c| c["id"] == *customer_id)
        .map_or((Value::Null, Value::Null), |c| (c["name"].clone(), c["email"].clone()))
}

async fn create_order(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let mut data = b.lock();
    data.next_id += 1;
    let (name, email) = customer_fields(&data, &body["customer_id"]);
    let row = json!({
        "order_id": data.next_id,
        "customer_id": body["customer_id"],
        "customer_name": name,
        "customer_email": email,
        "status": body["status"],
        "created_at": "2024-04-02T08:00:00Z",
    });
    data.orders.push(row.clone());
    reply(StatusCode::CREATED, row)
}

async fn update_order(
    State(b): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin", "editor"]) {
        return denied;
    }
    let mut data = b.lock();
    let (name, email) = customer_fields(&data, &body["customer_id"]);
    let Some(row) = data.orders.iter_mut().find(|o| o["order_id"] == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "error": "Order not found" }));
    };
    row["customer_id"] = body["customer_id"].clone();
    row["customer_name"] = name;
    row["customer_email"] = email;
    row["status"] = body["status"].clone();
    reply(StatusCode::OK, row.clone())
}

async fn delete_order(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(denied) = b.authorize(&headers, &["admin"]) {
        return denied;
    }
    b.lock().orders.retain(|o| o["order_id"] != id);
    reply(StatusCode::OK, json!({ "message": "Order deleted" }))
}

// Dashboard aggregates

async fn total_sales(State(b): State<Shared>, headers: HeaderMap) -> Response {
    match b.authorize(&headers, &[]) {
        Ok(_) => reply(StatusCode::OK, json!({ "total_sales": "1520.75" })),
        Err(denied) => denied,
    }
}

async fn total_orders(State(b): State<Shared>, headers: HeaderMap) -> Response {
    match b.authorize(&headers, &[]) {
        Ok(_) => {
            let count = b.lock().orders.len();
            reply(StatusCode::OK, json!({ "total_orders": count }))
        }
        Err(denied) => denied,
    }
}

async fn total_customers(State(b): State<Shared>, headers: HeaderMap) -> Response {
    match b.authorize(&headers, &[]) {
        Ok(_) => {
            let count = b.lock().customers.len();
            reply(StatusCode::OK, json!({ "total_customers": count }))
        }
        Err(denied) => denied,
    }
}

async fn chart(b: &Backend, headers: &HeaderMap, rows: Value) -> Response {
    if let Err(denied) = b.authorize(headers, &[]) {
        return denied;
    }
    if b.fail_charts.load(Ordering::SeqCst) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Chart query failed" }));
    }
    reply(StatusCode::OK, rows)
}

async fn sales_by_category(State(b): State<Shared>, headers: HeaderMap) -> Response {
    chart(&b, &headers, json!([
        { "category_name": "Mugs", "total_sales": "500.00" },
        { "category_name": "Shirts", "total_sales": "1020.75" },
    ]))
    .await
}

async fn sales_by_product(State(b): State<Shared>, headers: HeaderMap) -> Response {
    chart(&b, &headers, json!([
        { "product_name": "Blue Mug", "total_sales": "500.00" },
        { "product_name": "Logo Shirt", "total_sales": "1020.75" },
    ]))
    .await
}

async fn top_customers(State(b): State<Shared>, headers: HeaderMap) -> Response {
    chart(&b, &headers, json!([
        { "customer_name": "Ada Shop", "total_spent": "900.00" },
        { "customer_name": "Bo Market", "total_spent": "620.75" },
    ]))
    .await
}

fn router(backend: Shared) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", put(update_customer).delete(delete_customer))
        .route("/products/categories", get(list_categories))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", put(update_order).delete(delete_order))
        .route("/kpis/total-sales", get(total_sales))
        .route("/kpis/total-orders", get(total_orders))
        .route("/kpis/total-customers", get(total_customers))
        .route("/charts/sales-by-category", get(sales_by_category))
        .route("/charts/sales-by-product", get(sales_by_product))
        .route("/charts/top-customers", get(top_customers));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

pub struct TestServer {
    pub port: u16,
    pub api_url: String,
    pub backend: Shared,
}

impl TestServer {
    /// A fresh fake with its own data, bound to an unused port.
    pub async fn start() -> Result<Self> {
        // RUST_LOG=shop_admin=debug shows the client's request/renewal trace
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake back office")?;

        let backend = Arc::new(Backend {
            data: Mutex::new(seed()),
            token_seq: AtomicU64::new(1),
            refresh_calls: AtomicUsize::new(0),
            fail_refresh: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            fail_charts: AtomicBool::new(false),
        });
        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            port,
            api_url: format!("http://127.0.0.1:{}/api", port),
            backend,
        })
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::development().with_api_url(self.api_url.clone())
    }

    /// A client with an empty cookie jar, already through startup.
    pub async fn client(&self) -> Result<AppContext> {
        let ctx = AppContext::new(&self.config(), Arc::new(SessionJar::new()))?;
        ctx.start().await;
        Ok(ctx)
    }

    /// A client signed in with the given credentials.
    pub async fn signed_in(&self, (email, password): (&str, &str)) -> Result<AppContext> {
        let ctx = self.client().await?;
        ctx.login(email, password).await?;
        Ok(ctx)
    }
}
