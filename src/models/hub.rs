use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Hub {
    pub id: &'static str,
    pub name: &'static str,
    pub location: &'static str,
    pub price_per_hour: i64,
}

pub const HUBS: &[Hub] = &[
    Hub {
        id: "lekki",
        name: "Lekki Hub",
        location: "Lekki, Lagos",
        price_per_hour: 5000,
    },
    Hub {
        id: "sango",
        name: "Sango Hub",
        location: "Sango, Lagos",
        price_per_hour: 4500,
    },
    Hub {
        id: "yaba",
        name: "Yaba Hub",
        location: "Yaba, Lagos",
        price_per_hour: 4000,
    },
];

pub fn find_hub(id: &str) -> Option<&'static Hub> {
    let id = id.trim().to_lowercase();
    HUBS.iter().find(|hub| hub.id == id)
}

/// Legacy records sometimes only carry the display name.
pub fn find_hub_by_name(name: &str) -> Option<&'static Hub> {
    let name = name.trim();
    HUBS.iter().find(|hub| hub.name.eq_ignore_ascii_case(name))
}
