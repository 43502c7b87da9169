//! KPI cards for the shipments dashboard.

use crate::domain::KpiSnapshot;

pub const LOADING_VALUE: &str = "Cargando...";
pub const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
    pub color: &'static str,
}

struct CardDef {
    metric: &'static str,
    title: &'static str,
    unit: &'static str,
    description: &'static str,
    color: &'static str,
}

const CARDS: [CardDef; 6] = [
    CardDef {
        metric: KpiSnapshot::SLA_PERCENTAGE,
        title: "% de Envíos en SLA",
        unit: "%",
        description: "Envíos que llegaron dentro del tiempo prometido",
        color: "success",
    },
    CardDef {
        metric: KpiSnapshot::TEMPERATURE_COMPLIANCE,
        title: "% de Tartas en Temperatura",
        unit: "%",
        description: "Tartas que mantuvieron la temperatura correcta",
        color: "info",
    },
    CardDef {
        metric: KpiSnapshot::AVG_DELIVERY_TIME,
        title: "Tiempo Medio de Entrega",
        unit: " min",
        description: "Tiempo promedio de entrega",
        color: "primary",
    },
    CardDef {
        metric: KpiSnapshot::PRODUCT_CONDITION_RATE,
        title: "% de Condición del Producto",
        unit: "%",
        description: "Tartas entregadas en perfectas condiciones",
        color: "success",
    },
    CardDef {
        metric: KpiSnapshot::CUSTOMER_SATISFACTION,
        title: "Satisfacción del Cliente",
        unit: "/5",
        description: "Calificación promedio de clientes",
        color: "warning",
    },
    CardDef {
        metric: KpiSnapshot::MTT_DETECTION,
        title: "Tiempo Medio de Detección",
        unit: " seg",
        description: "Tiempo promedio para detectar problemas",
        color: "info",
    },
];

/// The six KPI cards. While the first load is in flight (loading and no
/// snapshot yet) every card reads `Cargando...`; otherwise the last known
/// snapshot is shown.
pub fn kpi_cards(kpis: &KpiSnapshot, loading: bool) -> Vec<KpiCard> {
    let first_load = loading && kpis.is_empty();
    CARDS
        .iter()
        .map(|def| KpiCard {
            title: def.title,
            value: if first_load {
                LOADING_VALUE.to_string()
            } else {
                match kpis.get(def.metric) {
                    Some(v) => format!("{}{}", v, def.unit),
                    None => format!("{}{}", MISSING_VALUE, def.unit),
                }
            },
            description: def.description,
            color: if first_load { "secondary" } else { def.color },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_values_with_units() {
        let kpis: KpiSnapshot = serde_json::from_str(
            r#"{"slaPercentage":96.5,"avgDeliveryTime":42,"customerSatisfaction":4.7}"#,
        )
        .unwrap();

        let cards = kpi_cards(&kpis, false);

        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].value, "96.5%");
        assert_eq!(cards[1].value, "N/A%");
        assert_eq!(cards[2].value, "42 min");
        assert_eq!(cards[4].value, "4.7/5");
        assert_eq!(cards[5].value, "N/A seg");
    }

    #[test]
    fn first_load_shows_placeholder_but_refresh_keeps_values() {
        let loading = kpi_cards(&KpiSnapshot::default(), true);
        assert!(loading.iter().all(|c| c.value == LOADING_VALUE && c.color == "secondary"));

        let kpis: KpiSnapshot = [("slaPercentage".to_string(), 90.0)].into_iter().collect();
        let refreshing = kpi_cards(&kpis, true);
        assert_eq!(refreshing[0].value, "90%");
    }
}
