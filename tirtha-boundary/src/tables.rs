//! Names of the backend tables and their key columns.

pub const CITIES: &str = "cities";
pub const SPOTS: &str = "spots";
pub const ROUTES: &str = "routes";
pub const EVENTS: &str = "events";
pub const PROFILES: &str = "profiles";
pub const LANGUAGES: &str = "languages";
pub const USER_FAVORITES: &str = "user_favorites";

// Join tables
pub const SPOT_ROUTE: &str = "spot_route";
pub const SPOT_EVENT: &str = "spot_event";
pub const ROUTE_EVENT: &str = "route_event";

pub const ID: &str = "id";
pub const CITY_ID: &str = "city_id";
pub const SPOT_ID: &str = "spot_id";
pub const ROUTE_ID: &str = "route_id";
pub const EVENT_ID: &str = "event_id";
pub const USER_ID: &str = "user_id";
pub const ITEM_ID: &str = "item_id";
pub const ITEM_TYPE: &str = "item_type";
pub const CREATED_BY: &str = "created_by";
