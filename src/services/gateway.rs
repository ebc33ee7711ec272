// ============================================================================
// ENTITY GATEWAY - Órdenes, pedidos, recolectas y entregas
// ============================================================================
// Cada operación: validación local → petición → (éxito) invalidación + aviso.
// Un fallo produce exactamente un aviso y no toca la caché.
// ============================================================================

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

use crate::config::CONFIG;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{
    Collect, CollectCreated, Delivery, ImageUpload, ImageUploadBody, Item, ItemUpdate, Lookup,
    NewCollect, NewDelivery, NewItem, Order, OrderUpdate, QueryPage,
};
use crate::services::api_client::ApiClient;
use crate::services::invalidation::Mutation;
use crate::services::transport::{HttpMethod, Transport};
use crate::state::notice_state::NoticeBoard;
use crate::state::query_cache::{CacheRead, QueryCache, QueryKey};
use crate::state::search_state::SearchState;
use crate::utils::constants::{
    collects_by_item_path, deliveries_by_item_path, image_path, item_path, items_by_order_path,
    order_path, COLLECT_PATH, DELIVERY_PATH, IMAGE_UPLOAD_PATH, ITEMS_PATH, ITEM_PATH, ORDERS_LIST_PATH,
    ORDER_PATH,
};

const LIST_ERROR: &str = "Error al obtener los registros";
const SEARCH_ERROR: &str = "Error en la búsqueda";

pub const ORDER_HAS_ITEMS: &str = "La orden tiene pedidos asociados, elimínelos primero";
pub const ITEM_NOT_PENDING: &str = "Solo se pueden eliminar pedidos en estado PENDIENTE";

/// Mensaje visible para el usuario. Los fallos de red/HTTP usan el genérico
/// de la operación; los del servidor y las validaciones, su propio texto.
fn user_message(error: &GatewayError, fallback: &str) -> String {
    match error {
        GatewayError::Api { message } => message.clone(),
        GatewayError::Rejected { reason } => reason.clone(),
        GatewayError::Upload { .. } => error.to_string(),
        GatewayError::Network(_) | GatewayError::Http { .. } | GatewayError::Decode(_) => {
            fallback.to_string()
        }
    }
}

/// Cursor opaco del servidor → `base64url(json)` para la query string
pub fn encode_cursor(cursor: &Value) -> GatewayResult<String> {
    let bytes = serde_json::to_vec(cursor)
        .map_err(|e| GatewayError::Decode(format!("cursor inválido: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

pub struct EntityGateway<T: Transport> {
    api: ApiClient<T>,
    cache: QueryCache,
    notices: NoticeBoard,
    search: SearchState,
}

impl<T: Transport> EntityGateway<T> {
    pub fn new(api: ApiClient<T>, cache: QueryCache, notices: NoticeBoard) -> Self {
        Self {
            api,
            cache,
            notices,
            search: SearchState::new(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Estado dependiente de la sesión (logout / sesión revocada)
    pub fn clear(&self) {
        self.cache.clear();
        self.search.reset();
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn report<R>(&self, fallback: &str, error: GatewayError) -> GatewayResult<R> {
        self.notices.error(user_message(&error, fallback));
        Err(error)
    }

    /// Lectura cacheada: `Fresh` se sirve sin red, el resto se pide al servidor
    async fn query<R>(&self, key: QueryKey, path: &str, fallback: &str) -> GatewayResult<R>
    where
        R: Serialize + DeserializeOwned,
    {
        if let CacheRead::Fresh(value) = self.cache.get::<R>(&key) {
            return Ok(value);
        }

        let ticket = self.cache.begin_fetch(&key);
        match self.api.get::<R>(path).await {
            Ok(value) => {
                self.cache.complete(&ticket, &value);
                Ok(value)
            }
            Err(e) => {
                self.cache.fail(&ticket);
                self.report(fallback, e)
            }
        }
    }

    /// Mutación: la invalidación solo se aplica tras una respuesta exitosa
    async fn mutate<R, F>(
        &self,
        mutation: Mutation,
        success: &str,
        fallback: &str,
        request: F,
    ) -> GatewayResult<R>
    where
        F: Future<Output = GatewayResult<R>>,
    {
        match request.await {
            Ok(value) => {
                let touched = mutation.apply(&self.cache);
                log::debug!("{:?} → {} entradas invalidadas", mutation, touched);
                self.notices.success(success);
                Ok(value)
            }
            Err(e) => self.report(fallback, e),
        }
    }

    // ========================================================================
    // ÓRDENES
    // ========================================================================

    pub async fn orders(&self) -> GatewayResult<Vec<Order>> {
        let page: QueryPage<Order> = self
            .query(QueryKey::orders(), ORDERS_LIST_PATH, LIST_ERROR)
            .await?;
        Ok(page.items)
    }

    /// El servidor asigna id y fecha
    pub async fn create_order(&self) -> GatewayResult<Order> {
        self.mutate(
            Mutation::CreateOrder,
            "Orden creada exitosamente",
            "Error al crear la orden",
            self.api.post::<(), Order>(ORDER_PATH, None),
        )
        .await
    }

    pub async fn update_order(&self, id: &str, update: &OrderUpdate) -> GatewayResult<Order> {
        self.mutate(
            Mutation::UpdateOrder { id: id.to_string() },
            "Orden actualizada exitosamente",
            "Error al actualizar la orden",
            self.api.put(&order_path(id), update),
        )
        .await
    }

    /// Solo se elimina una orden sin pedidos
    pub async fn delete_order(&self, id: &str) -> GatewayResult<()> {
        let items = self.items_by_order(id).await?;
        if !items.is_empty() {
            log::warn!("⚠️ Orden {} con {} pedidos, no se elimina", id, items.len());
            return self.report(ORDER_HAS_ITEMS, GatewayError::rejected(ORDER_HAS_ITEMS));
        }

        self.mutate(
            Mutation::DeleteOrder { id: id.to_string() },
            "Orden eliminada exitosamente",
            "Error al eliminar la orden",
            self.api.delete(&order_path(id)),
        )
        .await
    }

    // ========================================================================
    // PEDIDOS
    // ========================================================================

    pub async fn items_by_order(&self, order_id: &str) -> GatewayResult<Vec<Item>> {
        let page: QueryPage<Item> = self
            .query(
                QueryKey::items(order_id),
                &items_by_order_path(order_id),
                LIST_ERROR,
            )
            .await?;
        Ok(page.items)
    }

    /// Primera página de la vista "todos los pedidos"
    pub async fn all_items(&self) -> GatewayResult<QueryPage<Item>> {
        self.query(QueryKey::all_items(), ITEMS_PATH, LIST_ERROR).await
    }

    /// Trae la siguiente página y la agrega a la vista cacheada.
    /// `Ok(false)` si no hay más páginas.
    pub async fn load_more_items(&self) -> GatewayResult<bool> {
        let key = QueryKey::all_items();
        let Some(cursor) = self
            .cache
            .peek::<QueryPage<Item>>(&key)
            .and_then(|page| page.cursor)
        else {
            return Ok(false);
        };

        let path = match encode_cursor(&cursor) {
            Ok(encoded) => format!("{}?cursor={}", ITEMS_PATH, encoded),
            Err(e) => return self.report(LIST_ERROR, e),
        };
        let next: QueryPage<Item> = match self.api.get(&path).await {
            Ok(page) => page,
            Err(e) => return self.report(LIST_ERROR, e),
        };

        log::info!("📦 Página adicional: {} pedidos", next.items.len());
        self.cache.update::<QueryPage<Item>, _>(&key, |page| {
            page.items.extend(next.items);
            page.cursor = next.cursor;
        });
        Ok(true)
    }

    /// Búsqueda por comprobante. Solo la última búsqueda publica su resultado;
    /// una respuesta que llega tarde devuelve `Lookup::Superseded`.
    pub async fn find_item(&self, voucher_id: &str) -> GatewayResult<Lookup<Item>> {
        let voucher_id = voucher_id.trim();
        let ticket = self.search.begin();
        if voucher_id.is_empty() {
            self.search.complete(ticket, None);
            return self.report(
                SEARCH_ERROR,
                GatewayError::rejected("Campo requerido: comprobante"),
            );
        }

        log::info!("🔍 Buscando pedido: {}", voucher_id);
        let result = self
            .api
            .call::<Item>(HttpMethod::Get, &item_path(voucher_id), None)
            .await;

        if !self.search.is_latest(ticket) {
            log::debug!("🔍 Respuesta de {} descartada", voucher_id);
            return Ok(Lookup::Superseded);
        }

        match result {
            Ok(Lookup::Found(item)) => {
                self.cache.set(&QueryKey::item(voucher_id), &item);
                self.search.complete(ticket, Some(item.clone()));
                Ok(Lookup::Found(item))
            }
            Ok(Lookup::NotFound(message)) => {
                self.search.complete(ticket, None);
                self.notices.info(message.clone());
                Ok(Lookup::NotFound(message))
            }
            Ok(Lookup::Superseded) => Ok(Lookup::Superseded),
            Err(e) => {
                self.search.complete(ticket, None);
                self.report(SEARCH_ERROR, e)
            }
        }
    }

    pub async fn create_item(&self, item: &NewItem) -> GatewayResult<Item> {
        if let Err(e) = item.validate() {
            return self.report("Error al crear el pedido", e);
        }
        self.mutate(
            Mutation::CreateItem {
                order_id: item.order_id.clone(),
            },
            "Pedido creado exitosamente",
            "Error al crear el pedido",
            self.api.post(ITEM_PATH, Some(item)),
        )
        .await
    }

    pub async fn update_item(
        &self,
        order_id: &str,
        voucher_id: &str,
        update: &ItemUpdate,
    ) -> GatewayResult<Item> {
        if let Err(e) = update.validate() {
            return self.report("Error al actualizar el pedido", e);
        }
        self.mutate(
            Mutation::UpdateItem {
                order_id: order_id.to_string(),
                voucher_id: voucher_id.to_string(),
            },
            "Pedido actualizado exitosamente",
            "Error al actualizar el pedido",
            self.api.put(&item_path(voucher_id), update),
        )
        .await
    }

    /// Solo pedidos en estado PENDIENTE
    pub async fn delete_item(&self, item: &Item) -> GatewayResult<()> {
        if !item.is_pending() {
            return self.report(ITEM_NOT_PENDING, GatewayError::rejected(ITEM_NOT_PENDING));
        }
        self.mutate(
            Mutation::DeleteItem {
                order_id: item.order_id.clone(),
                voucher_id: item.voucher_id.clone(),
            },
            "Pedido eliminado exitosamente",
            "Error al eliminar el pedido",
            self.api.delete(&item_path(&item.voucher_id)),
        )
        .await
    }

    // ========================================================================
    // RECOLECTAS Y ENTREGAS
    // ========================================================================

    pub async fn collects(&self, voucher_id: &str) -> GatewayResult<Vec<Collect>> {
        let page: QueryPage<Collect> = self
            .query(
                QueryKey::collects(voucher_id),
                &collects_by_item_path(voucher_id),
                LIST_ERROR,
            )
            .await?;
        Ok(page.items)
    }

    /// La respuesta trae el pedido con su `collected` actualizado: se publica
    /// en la búsqueda y en las vistas cacheadas sin volver a pedirlas.
    pub async fn create_collect(&self, collect: &NewCollect) -> GatewayResult<CollectCreated> {
        if let Err(e) = collect.validate() {
            return self.report("Error al crear la recolecta", e);
        }
        let created: CollectCreated = self
            .mutate(
                Mutation::CreateCollect {
                    voucher_id: collect.voucher_id.clone(),
                },
                "Recolecta creada exitosamente",
                "Error al crear la recolecta",
                self.api.post(COLLECT_PATH, Some(collect)),
            )
            .await?;

        self.refresh_item(&created.item);
        Ok(created)
    }

    fn refresh_item(&self, item: &Item) {
        self.search.refresh(item);
        self.cache.set(&QueryKey::item(item.voucher_id.as_str()), item);

        let replace = |page: &mut QueryPage<Item>| {
            for shown in page.items.iter_mut() {
                if shown.voucher_id == item.voucher_id {
                    *shown = item.clone();
                }
            }
        };
        self.cache
            .update(&QueryKey::items(item.order_id.as_str()), replace);
        self.cache.update(&QueryKey::all_items(), replace);
    }

    pub async fn deliveries(&self, voucher_id: &str) -> GatewayResult<Vec<Delivery>> {
        let page: QueryPage<Delivery> = self
            .query(
                QueryKey::deliveries(voucher_id),
                &deliveries_by_item_path(voucher_id),
                LIST_ERROR,
            )
            .await?;
        Ok(page.items)
    }

    pub async fn create_delivery(&self, delivery: &NewDelivery) -> GatewayResult<Delivery> {
        if let Err(e) = delivery.validate() {
            return self.report("Error al crear la entrega", e);
        }
        self.mutate(
            Mutation::CreateDelivery {
                voucher_id: delivery.voucher_id.clone(),
            },
            "Entrega creada exitosamente",
            "Error al crear la entrega",
            self.api.post(DELIVERY_PATH, Some(delivery)),
        )
        .await
    }

    // ========================================================================
    // IMÁGENES
    // ========================================================================

    /// Cada archivo se reporta por separado, con su nombre
    pub async fn upload_image(&self, upload: &ImageUpload) -> GatewayResult<Value> {
        let fail = |reason: String| GatewayError::Upload {
            file_name: upload.file_name.clone(),
            reason,
        };

        if !CONFIG.accepts_content_type(&upload.content_type) {
            let reason = format!("tipo de archivo no permitido ({})", upload.content_type);
            return self.report("", fail(reason));
        }
        if upload.bytes.len() >= CONFIG.upload_max_bytes {
            let reason = format!(
                "la imagen debe pesar menos de {} MB",
                CONFIG.upload_max_bytes / (1024 * 1024)
            );
            return self.report("", fail(reason));
        }

        let body = ImageUploadBody {
            image_body: STANDARD.encode(&upload.bytes),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
        };

        log::info!("📤 Subiendo {} ({} bytes)", upload.file_name, upload.bytes.len());
        match self.api.post::<_, Value>(IMAGE_UPLOAD_PATH, Some(&body)).await {
            Ok(stored) => {
                self.notices
                    .success(format!("{} cargado exitosamente", upload.file_name));
                Ok(stored)
            }
            Err(e) => {
                let reason = match e {
                    GatewayError::Api { message } => message,
                    other => other.to_string(),
                };
                self.report("", fail(reason))
            }
        }
    }

    /// URL firmada de la imagen de un comprobante. La firma vence, así que no
    /// se cachea: cada llamada pide una nueva.
    pub async fn image_url(&self, key: &str) -> GatewayResult<String> {
        match self.api.get(&image_path(key)).await {
            Ok(url) => Ok(url),
            Err(e) => self.report("Error al obtener la imagen", e),
        }
    }
}
