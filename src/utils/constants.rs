// Rutas del API consumidas por el cliente (relativas a `CONFIG.api_base_url()`)
// Los identificadores se escriben a mano: se codifican como segmento de ruta.

use urlencoding::encode;

pub const ORDER_PATH: &str = "/order";
pub const ORDERS_LIST_PATH: &str = "/manager/order";
pub const ITEM_PATH: &str = "/item";
pub const ITEMS_PATH: &str = "/manager/items";
pub const COLLECT_PATH: &str = "/collect";
pub const COLLECTS_BY_ITEM_PATH: &str = "/manager/collect/item";
pub const DELIVERY_PATH: &str = "/delivery";
pub const DELIVERIES_BY_ITEM_PATH: &str = "/manager/delivery/item";
pub const IMAGE_UPLOAD_PATH: &str = "/manager/image/upload";
pub const IMAGE_PATH: &str = "/manager/image";

/// `/order/{id}`
pub fn order_path(id: &str) -> String {
    format!("{}/{}", ORDER_PATH, encode(id))
}

/// `/item/{voucherId}`
pub fn item_path(voucher_id: &str) -> String {
    format!("{}/{}", ITEM_PATH, encode(voucher_id))
}

pub fn items_by_order_path(order_id: &str) -> String {
    format!("{}/{}", ITEMS_PATH, encode(order_id))
}

pub fn collects_by_item_path(voucher_id: &str) -> String {
    format!("{}/{}", COLLECTS_BY_ITEM_PATH, encode(voucher_id))
}

pub fn deliveries_by_item_path(voucher_id: &str) -> String {
    format!("{}/{}", DELIVERIES_BY_ITEM_PATH, encode(voucher_id))
}

pub fn image_path(key: &str) -> String {
    format!("{}/{}", IMAGE_PATH, encode(key))
}
