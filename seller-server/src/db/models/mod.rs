//! Database Models
//!
//! Entity shapes persisted in SurrealDB plus the API payload types.

pub mod serde_helpers;

pub mod bundle;
pub mod category;
pub mod discount;
pub mod product;
pub mod sale;
pub mod seller;

pub use bundle::{Bundle, BundleCreate, BundleLine, BundleLineInput, BundleUpdate};
pub use category::Category;
pub use discount::{Discount, DiscountCreate, DiscountKind, DiscountTarget, DiscountUpdate};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use sale::{
    Sale, SaleAddProducts, SaleBundle, SaleCategory, SaleCategoryInput, SaleCreate, SaleProduct,
    SaleProductInput, SaleRemoveProducts,
};
pub use seller::{SellerProfile, SellerProfileCreate, SellerProfileUpdate};
