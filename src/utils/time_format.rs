/// Etiqueta relativa en español para un instante pasado (ambos en epoch ms)
pub fn format_time_ago(timestamp_ms: i64, now_ms: i64) -> String {
    let diff_seconds = (now_ms - timestamp_ms).max(0) / 1000;
    let minutes = diff_seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = months / 12;

    if minutes < 1 {
        return "En este momento".to_string();
    }
    if hours < 1 {
        return plural(minutes, "minuto", "minutos");
    }
    if days < 1 {
        return plural(hours, "hora", "horas");
    }
    if months < 1 {
        return match days {
            1 => "ayer".to_string(),
            n => plural(n, "día", "días"),
        };
    }
    if years < 1 {
        return match months {
            1 => "el mes pasado".to_string(),
            n => plural(n, "mes", "meses"),
        };
    }
    match years {
        1 => "el año pasado".to_string(),
        n => plural(n, "año", "años"),
    }
}

fn plural(n: i64, one: &str, many: &str) -> String {
    format!("hace {} {}", n, if n == 1 { one } else { many })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60 * 1000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    #[test]
    fn labels_follow_the_largest_unit() {
        let now = 400 * DAY;
        assert_eq!(format_time_ago(now - 30 * 1000, now), "En este momento");
        assert_eq!(format_time_ago(now - MINUTE, now), "hace 1 minuto");
        assert_eq!(format_time_ago(now - 5 * MINUTE, now), "hace 5 minutos");
        assert_eq!(format_time_ago(now - 3 * HOUR, now), "hace 3 horas");
        assert_eq!(format_time_ago(now - DAY, now), "ayer");
        assert_eq!(format_time_ago(now - 4 * DAY, now), "hace 4 días");
        assert_eq!(format_time_ago(now - 65 * DAY, now), "hace 2 meses");
        assert_eq!(format_time_ago(now - 370 * DAY, now), "el año pasado");
    }

    #[test]
    fn future_timestamps_read_as_now() {
        assert_eq!(format_time_ago(10 * MINUTE, 0), "En este momento");
    }
}
