// ============================================================================
// RECEIPT - Datos del comprobante de entrega
// ============================================================================
// Solo arma el contenido (encabezado, líneas y nombre de archivo); el dibujo
// del PDF lo hace la vista.
// ============================================================================

use chrono::{Local, TimeZone};
use std::fmt;

use crate::models::{Delivery, Item};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// `15.0` → "15", `2.5` → "2.5"
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

/// `dd/mm/aaaa hh:mm:ss` en la zona horaria indicada
pub fn format_issued_at<Tz>(secs: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    tz.timestamp_opt(secs, 0)
        .single()
        .map(|at| at.format("%d/%m/%Y %H:%M:%S").to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    /// `# {createdAt en base 36}` si la entrega tiene fecha
    pub title: Option<String>,
    /// Hora local del navegador
    pub issued_at: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub file_name: String,
}

impl DeliveryReceipt {
    pub fn from_delivery(item: &Item, delivery: &Delivery, now_ms: i64) -> Self {
        let title = delivery
            .created_at
            .and_then(|secs| u64::try_from(secs).ok())
            .map(|secs| format!("# {}", to_base36(secs).to_uppercase()));

        let issued_at = delivery
            .created_at
            .and_then(|secs| format_issued_at(secs, &Local));

        let line = |label, value: String| ReceiptLine { label, value };
        let lines = vec![
            line("Comprobante", delivery.voucher_id.clone()),
            line("Cliente", delivery.customer.clone()),
            line("Entregado por", delivery.driver.clone()),
            line("Camion", delivery.truck.clone()),
            line("Producto", item.product.label().to_string()),
            line("Cantidad", format_quantity(delivery.quantity)),
        ];

        let stamp = to_base36(u64::try_from(now_ms).unwrap_or_default());
        let suffix = stamp.get(4..).unwrap_or_default();

        Self {
            title,
            issued_at,
            lines,
            file_name: format!("pedido-{}-{}.pdf", delivery.voucher_id, suffix),
        }
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.label == label)
            .map(|line| line.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, Status};
    use chrono::{FixedOffset, Utc};

    fn fixtures() -> (Item, Delivery) {
        let item = Item {
            id: "i-1".to_string(),
            voucher_id: "V1".to_string(),
            order_id: "O1".to_string(),
            product: Product::CementoAriblock,
            quantity: 40.0,
            collected: 40.0,
            voucher_key: None,
            status: Some(Status::Collected),
            created_at: None,
            update_at: None,
        };
        let delivery = Delivery {
            id: Some("d-1".to_string()),
            voucher_id: "V1".to_string(),
            driver: "Luis".to_string(),
            truck: "C-12".to_string(),
            quantity: 15.0,
            customer: "Ferretería Central".to_string(),
            created_at: Some(1_700_000_000),
        };
        (item, delivery)
    }

    #[test]
    fn base36_matches_number_to_string_36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn receipt_lines_and_file_name() {
        let (item, delivery) = fixtures();
        let receipt = DeliveryReceipt::from_delivery(&item, &delivery, 1_700_000_000_000);

        assert_eq!(receipt.file_name, "pedido-V1-3v28.pdf");
        assert_eq!(receipt.value_of("Cliente"), Some("Ferretería Central"));
        assert_eq!(receipt.value_of("Producto"), Some("Cemento Ariblock"));
        assert_eq!(receipt.value_of("Cantidad"), Some("15"));
        assert_eq!(receipt.lines.len(), 6);
        assert_eq!(receipt.issued_at, format_issued_at(1_700_000_000, &Local));
        assert_eq!(receipt.title.as_deref(), Some("# S44WE8"));
    }

    #[test]
    fn issued_at_follows_the_time_zone() {
        assert_eq!(
            format_issued_at(1_700_000_000, &Utc).as_deref(),
            Some("14/11/2023 22:13:20")
        );
        let bogota = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            format_issued_at(1_700_000_000, &bogota).as_deref(),
            Some("14/11/2023 17:13:20")
        );
    }

    #[test]
    fn missing_created_at_has_no_header() {
        let (item, mut delivery) = fixtures();
        delivery.created_at = None;
        delivery.quantity = 2.5;
        let receipt = DeliveryReceipt::from_delivery(&item, &delivery, 1_700_000_000_000);
        assert!(receipt.title.is_none());
        assert!(receipt.issued_at.is_none());
        assert_eq!(receipt.value_of("Cantidad"), Some("2.5"));
    }
}
