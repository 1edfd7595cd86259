//! Typed API surface
//!
//! One wrapper per backend endpoint. List/fetch responses pass through the
//! normalizer so nothing downstream ever sees a raw payload.

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use shared::client::{AdminIdentity, LoginRequest, LoginResponse};
use shared::models::catering::{CateringRequest, CateringSubmission, CateringStatus, UpdateCateringStatus};
use shared::models::menu::{MenuItem, MenuItemCreate, MenuItemUpdate, OptionGroup};
use shared::models::order::{
    AcceptOrder, LegacyOrderCreate, Order, OrderCreate, OrderCreated, OrderStatus, OverviewStats,
    RejectOrder, SetOrderPaid, UpdateOrderStatus,
};
use shared::models::store_status::StoreStatus;
use shared::models::wait_times::WaitTimesConfig;
use shared::normalize;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

/// Multipart menu item form (create or update)
///
/// The price field carries the operator-entered integer kronor value as-is.
#[derive(Debug, Clone, Default)]
pub struct MenuItemForm {
    pub name: Option<String>,
    pub sek_price: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
    pub option_groups: Option<Vec<OptionGroup>>,
    /// (file name, bytes, mime type)
    pub image: Option<(String, Vec<u8>, String)>,
}

impl MenuItemForm {
    fn into_form(self) -> ClientResult<Form> {
        let mut form = Form::new();
        if let Some(name) = self.name {
            form = form.text("name", name);
        }
        if let Some(price) = self.sek_price {
            form = form.text("price", (price.round() as i64).to_string());
        }
        if let Some(category) = self.category {
            form = form.text("category", category);
        }
        if let Some(description) = self.description {
            form = form.text("description", description);
        }
        if let Some(is_available) = self.is_available {
            form = form.text("isAvailable", is_available.to_string());
        }
        if let Some(groups) = self.option_groups {
            form = form.text("optionGroups", serde_json::to_string(&groups)?);
        }
        if let Some((file_name, bytes, mime)) = self.image {
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(&mime)
                .map_err(|e| ClientError::Validation(format!("invalid image mime type: {}", e)))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// Typed API client over any [`HttpClient`]
#[derive(Debug, Clone)]
pub struct Api<C: HttpClient> {
    http: C,
}

impl<C: HttpClient> Api<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    // ========== Menu ==========

    pub async fn list_menu(&self) -> ClientResult<Vec<MenuItem>> {
        let raw: Vec<Value> = self.http.get("menu").await?;
        Ok(raw.iter().map(normalize::normalize_menu_item).collect())
    }

    pub async fn add_menu_item(&self, payload: &MenuItemCreate) -> ClientResult<MenuItem> {
        let raw: Value = self.http.post("menu-items", payload).await?;
        Ok(normalize::normalize_menu_item(&raw))
    }

    pub async fn create_menu_item_multipart(&self, form: MenuItemForm) -> ClientResult<MenuItem> {
        let raw: Value = self
            .http
            .post_multipart("menu-items", form.into_form()?)
            .await?;
        Ok(normalize::normalize_menu_item(&raw))
    }

    pub async fn update_menu_item_multipart(
        &self,
        id: &str,
        form: MenuItemForm,
    ) -> ClientResult<MenuItem> {
        let raw: Value = self
            .http
            .patch_multipart(&format!("menu-items/{}", id), form.into_form()?)
            .await?;
        Ok(normalize::normalize_menu_item(&raw))
    }

    pub async fn update_menu_item(
        &self,
        id: &str,
        payload: &MenuItemUpdate,
    ) -> ClientResult<MenuItem> {
        let raw: Value = self.http.patch(&format!("menu-items/{}", id), payload).await?;
        Ok(normalize::normalize_menu_item(&raw))
    }

    pub async fn delete_menu_item(&self, id: &str) -> ClientResult<()> {
        self.http.delete(&format!("menu-items/{}", id)).await
    }

    // ========== Orders ==========

    /// Legacy basket-shaped order creation
    pub async fn create_order_legacy(&self, payload: &LegacyOrderCreate) -> ClientResult<String> {
        let raw: Value = self.http.post("orders", payload).await?;
        order_id_from(&raw)
    }

    /// Versioned order creation
    pub async fn create_order(&self, payload: &OrderCreate) -> ClientResult<OrderCreated> {
        self.http.post("orders", payload).await
    }

    pub async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let raw: Value = self.http.get(&format!("orders/{}", order_id)).await?;
        Ok(normalize::normalize_order(&raw))
    }

    /// Resolve a 5-digit lookup code to a backend order id
    pub async fn lookup_order_id(&self, code: &str) -> ClientResult<String> {
        let raw: Value = self.http.get(&format!("orders/lookup/{}", code)).await?;
        order_id_from(&raw)
    }

    // ========== Admin: auth ==========

    /// Exchange credentials for a bearer token and store it on the client
    pub async fn admin_login(&mut self, email: &str, password: &str) -> ClientResult<String> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.http.post("auth/login", &req).await?;
        self.http.set_token(Some(resp.token.clone()));
        Ok(resp.token)
    }

    pub async fn admin_me(&self) -> ClientResult<AdminIdentity> {
        self.http.get("admin/me").await
    }

    pub fn clear_token(&mut self) {
        self.http.set_token(None);
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.http.set_token(Some(token.into()));
    }

    // ========== Admin: orders ==========

    pub async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let raw: Vec<Value> = self.http.get("admin/orders").await?;
        Ok(raw.iter().map(normalize::normalize_order).collect())
    }

    pub async fn list_active_orders(&self) -> ClientResult<Vec<Order>> {
        let raw: Vec<Value> = self.http.get("admin/orders/active").await?;
        Ok(raw.iter().map(normalize::normalize_order).collect())
    }

    pub async fn overview_stats(&self) -> ClientResult<OverviewStats> {
        self.http.get("admin/stats/overview").await
    }

    pub async fn accept_order(&self, order_id: &str, eta_minutes: Option<i64>) -> ClientResult<()> {
        let _: Value = self
            .http
            .post(
                &format!("admin/orders/{}/accept", order_id),
                &AcceptOrder { eta_minutes },
            )
            .await?;
        Ok(())
    }

    pub async fn reject_order(&self, order_id: &str, reason: Option<String>) -> ClientResult<()> {
        let _: Value = self
            .http
            .post(
                &format!("admin/orders/{}/reject", order_id),
                &RejectOrder { reason },
            )
            .await?;
        Ok(())
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .post(
                &format!("admin/orders/{}/status", order_id),
                &UpdateOrderStatus { status },
            )
            .await?;
        Ok(())
    }

    pub async fn set_order_paid(&self, order_id: &str, paid: bool) -> ClientResult<()> {
        let _: Value = self
            .http
            .post(
                &format!("admin/orders/{}/paid", order_id),
                &SetOrderPaid { paid },
            )
            .await?;
        Ok(())
    }

    // ========== Wait times ==========

    pub async fn get_wait_times(&self) -> ClientResult<WaitTimesConfig> {
        self.http.get("wait-times").await
    }

    pub async fn admin_get_wait_times(&self) -> ClientResult<WaitTimesConfig> {
        self.http.get("admin/wait-times").await
    }

    pub async fn admin_set_wait_times(
        &self,
        config: &WaitTimesConfig,
    ) -> ClientResult<WaitTimesConfig> {
        self.http.post("admin/wait-times", config).await
    }

    // ========== Catering ==========

    pub async fn submit_catering_request(&self, payload: &CateringSubmission) -> ClientResult<()> {
        let _: Value = self.http.post("catering/requests", payload).await?;
        Ok(())
    }

    pub async fn admin_list_catering_requests(&self) -> ClientResult<Vec<CateringRequest>> {
        let raw: Vec<Value> = self.http.get("admin/catering/requests").await?;
        Ok(raw.iter().map(normalize::normalize_catering_request).collect())
    }

    pub async fn admin_update_catering_status(
        &self,
        id: &str,
        status: CateringStatus,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .post(
                &format!("admin/catering/requests/{}/status", id),
                &UpdateCateringStatus { status },
            )
            .await?;
        Ok(())
    }

    // ========== Store status ==========

    pub async fn get_store_status(&self) -> ClientResult<StoreStatus> {
        self.http.get("store-status").await
    }

    pub async fn admin_set_store_status(&self, status: &StoreStatus) -> ClientResult<StoreStatus> {
        self.http.post("admin/store-status", status).await
    }

    // ========== Driver ==========

    /// Push a driver position, authenticated by the driver's own token
    pub async fn driver_upsert_location(
        &self,
        driver_token: &str,
        order_id: &str,
        lat: f64,
        lng: f64,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .post_with_token(
                &format!("driver/orders/{}/location", order_id),
                &serde_json::json!({ "lat": lat, "lng": lng }),
                driver_token,
            )
            .await?;
        Ok(())
    }
}

fn order_id_from(raw: &Value) -> ClientResult<String> {
    let id = normalize::resolve_id(raw, &["orderId", "id", "_id"]);
    if id.is_empty() {
        return Err(ClientError::InvalidResponse(
            "missing order id in response".to_string(),
        ));
    }
    Ok(id)
}
