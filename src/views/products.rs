use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::{filled, Affordances, Collection, Notice, Payload, Table, View};
use crate::app::AppContext;
use crate::capability::ResourceKind;
use crate::resources::ListQuery;
use crate::http::{ApiClient, ApiRequest, FilePart, FormField};
use crate::types::{Category, Product, RecordId};

pub const CATEGORIES_PATH: &str = "/products/categories";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub category_id: Option<RecordId>,
    /// Replaces the stored image when set.
    pub image: Option<FilePart>,
}

pub struct ProductsView {
    api: Arc<ApiClient>,
    list: Collection<Product>,
    categories: Vec<Category>,
    pub form: ProductForm,
}

impl ProductsView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api.clone(),
            list: Collection::new(ctx, ResourceKind::Products),
            categories: Vec::new(),
            form: ProductForm::default(),
        }
    }

    pub fn items(&self) -> &[Product] {
        &self.list.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn editing(&self) -> Option<RecordId> {
        self.list.editing
    }

    /// Server-side filters applied by the next refresh.
    pub fn filters_mut(&mut self) -> &mut ListQuery {
        &mut self.list.query
    }

    pub async fn refresh(&mut self) {
        self.list.refresh().await;
    }

    pub async fn load_categories(&mut self) {
        match self
            .api
            .send_json::<Vec<Category>>(ApiRequest::get(CATEGORIES_PATH))
            .await
        {
            Ok(categories) => self.categories = categories,
            Err(err) => self.list.notices.failure("Error fetching categories", &err),
        }
    }

    pub async fn set_search(&mut self, search: impl Into<String>) {
        self.list.query.search = Some(search.into());
        self.refresh().await;
    }

    /// Filter by category id; `None` shows every category.
    pub async fn set_category(&mut self, category_id: Option<RecordId>) {
        self.list.query.category = category_id.map(|id| id.to_string());
        self.refresh().await;
    }

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let Some(product) = self.list.begin_edit(id).cloned() else {
            return false;
        };
        // the list carries the category name; the form needs its id
        let category_id = product.category.as_deref().and_then(|name| {
            self.categories
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.id)
        });
        self.form = ProductForm {
            name: product.name,
            price: product.price.to_string(),
            category_id,
            image: None,
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.list.editing = None;
        self.form = ProductForm::default();
    }

    pub async fn submit(&mut self) -> bool {
        if !self.list.permit_write() {
            return false;
        }
        let (Some(name), Some(price), Some(category_id)) = (
            filled(&self.form.name),
            filled(&self.form.price),
            self.form.category_id,
        ) else {
            self.list.notices.alert("Name, price and category are required");
            return false;
        };
        let Ok(price) = Decimal::from_str(price) else {
            self.list.notices.alert("Price must be a number");
            return false;
        };

        let mut fields = vec![
            ("name".to_string(), FormField::Text(name.to_string())),
            ("price".to_string(), FormField::Text(price.to_string())),
            ("category_id".to_string(), FormField::Text(category_id.to_string())),
        ];
        if let Some(image) = &self.form.image {
            fields.push(("image".to_string(), FormField::File(image.clone())));
        }

        let saved = self.list.save(Payload::Multipart(fields), "product").await;
        if saved {
            self.form = ProductForm::default();
        }
        saved
    }

    pub async fn delete(&mut self, id: RecordId) -> bool {
        self.list.delete(id, "product").await
    }
}

#[async_trait]
impl View for ProductsView {
    fn title(&self) -> &'static str {
        "Products"
    }

    async fn load(&mut self) {
        self.load_categories().await;
        self.refresh().await;
    }

    fn tables(&self) -> Vec<Table> {
        let mut table = Table::new(
            "Products",
            &["ID", "Name", "Price", "Category", "Image"],
            "No products found",
        );
        for product in &self.list.items {
            table.push(vec![
                product.id.to_string(),
                product.name.clone(),
                format!("${}", product.price),
                product.category.clone().unwrap_or_default(),
                product
                    .image_url
                    .clone()
                    .unwrap_or_else(|| "No image".to_string()),
            ]);
        }
        vec![table.with_actions(self.affordances())]
    }

    fn affordances(&self) -> Affordances {
        self.list.affordances()
    }

    fn take_notices(&mut self) -> Vec<Notice> {
        self.list.notices.take()
    }
}
