use serde::{Deserialize, Serialize};

/// A zone of the floor plan. Tables are filtered by `hall_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub id: String,
    pub name: String,
    pub description: String,
}

const HALLS: [(&str, &str, &str); 5] = [
    ("white", "Белый зал", "Элегантный основной зал"),
    ("bar", "Бар зал", "Уютная барная зона"),
    ("vaulted", "Сводчатый зал", "Зал с арочными потолками"),
    ("fourth", "Четвертый зал", "Дополнительный зал"),
    ("banquet", "Банкетный зал", "Зал для больших мероприятий"),
];

pub fn catalogue() -> Vec<Hall> {
    HALLS
        .iter()
        .map(|(id, name, description)| Hall {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

pub fn is_known(hall_id: &str) -> bool {
    HALLS.iter().any(|(id, _, _)| *id == hall_id)
}
