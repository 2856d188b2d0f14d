//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod blog_post;
pub mod country;
pub mod dining_table;
pub mod dish;
pub mod dish_review;
pub mod favorite_dish;
pub mod favorite_restaurant;
pub mod feature;
pub mod gallery_image;
pub mod order;
pub mod order_item;
pub mod qr_code;
pub mod qr_scan;
pub mod restaurant;
pub mod restaurant_review;
pub mod service;
pub mod video;

// Re-export specific types to avoid conflicts
pub use blog_post::Entity as BlogPost;
pub use country::Entity as Country;
pub use dining_table::Entity as DiningTable;
pub use dish::Entity as Dish;
pub use dish_review::Entity as DishReview;
pub use favorite_dish::Entity as FavoriteDish;
pub use favorite_restaurant::Entity as FavoriteRestaurant;
pub use feature::Entity as Feature;
pub use gallery_image::Entity as GalleryImage;
pub use order::{Entity as Order, OrderStatus};
pub use order_item::Entity as OrderItem;
pub use qr_code::Entity as QrCode;
pub use qr_scan::Entity as QrScan;
pub use restaurant::{Entity as Restaurant, RestaurantStatus};
pub use restaurant_review::Entity as RestaurantReview;
pub use service::Entity as Service;
pub use video::Entity as Video;
