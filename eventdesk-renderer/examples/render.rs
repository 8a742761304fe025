use eventdesk_renderer::{render_record, Locale, RenderOptions};

use serde_json::json;

fn main() {
    env_logger::init();

    let event = json!({
        "_id": { "$oid": "66f1e0b5c2a4d3b9e8f7a601" },
        "name": "Congreso Nacional de Hematología",
        "startDate": { "$date": "2024-11-01T09:00:00.000Z" },
        "endDate": { "$date": { "$numberLong": "1730653200000" } },
        "capacity": 1500,
        "public": true,
        "tags": ["hematología", "oncología"],
        "speakers": [],
        "location": {
            "address": "Ágora Bogotá, Cra 55 # 24-55",
            "coordinates": { "latitude": 4.6288, "longitude": -74.0931 }
        },
        "eventStyles": {
            "banner": "https://ik.imagekit.io/eventdesk/banner-2024",
            "primaryColor": "#0b5394"
        },
        "modules": { "agenda": true, "chat": false, "posters": true },
        "website": "https://acho.com.co",
        "description": "<p>Encuentro anual <strong>ACHO</strong>.</p><script>track()</script>",
        "__v": 4
    });

    let record = match event.as_object() {
        Some(record) => record,
        None => return,
    };

    let options = RenderOptions::default()
        .order(["name", "startDate", "endDate"])
        .exclude("_id");
    println!("{}", render_record(record, &options).to_html());

    let options = options.locale(Locale::Es).label("startDate", "Fecha de inicio");
    println!("{}", render_record(record, &options).to_html());
}
