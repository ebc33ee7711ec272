use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GatewayError;

// ============================================================================
// ENTIDADES - Orden → Pedido → Recolectas / Entregas
// ============================================================================

/// Estado compartido por órdenes y pedidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "EN RUTA")]
    EnRoute,
    #[serde(rename = "RECOLECTADO")]
    Collected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::EnRoute, Status::Collected];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "PENDIENTE",
            Status::EnRoute => "EN RUTA",
            Status::Collected => "RECOLECTADO",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catálogo fijo de productos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "Monocapa Gris")]
    MonocapaGris,
    #[serde(rename = "Monocapa Blanco")]
    MonocapaBlanco,
    #[serde(rename = "Horcalsa")]
    Horcalsa,
    #[serde(rename = "Montaña")]
    Montana,
    #[serde(rename = "Cemento Ariblock")]
    CementoAriblock,
    #[serde(rename = "Monocapa Extraliso")]
    MonocapaExtraliso,
    #[serde(rename = "Monocapa Ultraliso")]
    MonocapaUltraliso,
}

impl Product {
    pub const CATALOG: [Product; 7] = [
        Product::MonocapaGris,
        Product::MonocapaBlanco,
        Product::Horcalsa,
        Product::Montana,
        Product::CementoAriblock,
        Product::MonocapaExtraliso,
        Product::MonocapaUltraliso,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Product::MonocapaGris => "Monocapa Gris",
            Product::MonocapaBlanco => "Monocapa Blanco",
            Product::Horcalsa => "Horcalsa",
            Product::Montana => "Montaña",
            Product::CementoAriblock => "Cemento Ariblock",
            Product::MonocapaExtraliso => "Monocapa Extraliso",
            Product::MonocapaUltraliso => "Monocapa Ultraliso",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Epoch en segundos, asignado por el servidor
    pub created_at: i64,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub update_at: Option<i64>,
}

/// Pedido: una línea de producto dentro de una orden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub voucher_id: String,
    pub order_id: String,
    pub product: Product,
    pub quantity: f64,
    /// Total acumulado de todas las recolectas
    #[serde(default)]
    pub collected: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_key: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub update_at: Option<i64>,
}

impl Item {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, Some(Status::Pending))
    }

    pub fn remaining(&self) -> f64 {
        (self.quantity - self.collected).max(0.0)
    }
}

/// Recolecta: material retirado contra un pedido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collect {
    #[serde(default)]
    pub id: Option<String>,
    pub voucher_id: String,
    pub driver: String,
    pub truck: String,
    pub quantity: f64,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Entrega: material entregado a un cliente contra un pedido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(default)]
    pub id: Option<String>,
    pub voucher_id: String,
    pub driver: String,
    pub truck: String,
    pub quantity: f64,
    pub customer: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Página devuelta por los endpoints de listado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<serde_json::Value>,
}

/// Respuesta de `POST /collect`: la recolecta y el pedido con su total actualizado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectCreated {
    pub collect: Collect,
    pub item: Item,
}

// ============================================================================
// FORMULARIOS
// ============================================================================

fn require_text(value: &str, field: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::rejected(format!("Campo requerido: {}", field)));
    }
    Ok(())
}

fn require_positive(value: f64, field: &str) -> Result<(), GatewayError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GatewayError::rejected(format!(
            "{} debe ser mayor que cero",
            field
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub voucher_id: String,
    pub order_id: String,
    pub product: Product,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(&self.order_id, "orden")?;
        require_text(&self.voucher_id, "comprobante")?;
        require_positive(self.quantity, "Cantidad")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ItemUpdate {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if let Some(voucher_id) = &self.voucher_id {
            require_text(voucher_id, "comprobante")?;
        }
        if let Some(quantity) = self.quantity {
            require_positive(quantity, "Cantidad")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollect {
    pub voucher_id: String,
    pub driver: String,
    pub truck: String,
    pub quantity: f64,
}

impl NewCollect {
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(&self.voucher_id, "comprobante")?;
        require_text(&self.driver, "piloto")?;
        require_text(&self.truck, "camion")?;
        require_positive(self.quantity, "Cantidad")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub voucher_id: String,
    pub driver: String,
    pub truck: String,
    pub quantity: f64,
    pub customer: String,
}

impl NewDelivery {
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(&self.voucher_id, "comprobante")?;
        require_text(&self.customer, "cliente")?;
        require_text(&self.driver, "piloto")?;
        require_text(&self.truck, "camion")?;
        require_positive(self.quantity, "Cantidad")
    }
}

/// Archivo seleccionado para subir como imagen del comprobante
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Cuerpo JSON de `POST /manager/image/upload`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadBody {
    pub image_body: String,
    pub file_name: String,
    pub content_type: String,
}
