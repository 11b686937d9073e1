//! sea-orm entities for the marketplace service.

pub mod bookings;
pub mod comments;
pub mod provider_profiles;
pub mod service_assets;
pub mod service_offerings;
pub mod users;
pub mod wishlist_items;
