//! Categories and subcategories: the user-defined groupings for transactions.

mod core;
mod endpoints;

pub use core::{
    Category, CategoryId, CategoryKind, Subcategory, SubcategoryId, create_category,
    create_category_tables, create_subcategory, delete_category, delete_subcategory,
    get_categories, get_category, update_category,
};
pub use endpoints::{
    create_category_endpoint, create_subcategory_endpoint, delete_category_endpoint,
    delete_subcategory_endpoint, get_categories_endpoint, update_category_endpoint,
};
