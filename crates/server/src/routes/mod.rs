mod health;
mod notes;
mod settings;

pub use health::health_routes;
pub use notes::notes_routes;
pub use settings::settings_routes;
