//! Categories for grouping income and expense transactions.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, find_or_create_unspecified,
    get_category, get_visible_categories, resolve_category, seed_default_categories,
    update_category, validate_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{
    Category, CategoryName, CategorySummary, CategoryType, EditCategoryForm, NewCategoryForm,
    UNSPECIFIED_CATEGORY_NAME,
};
pub use edit::update_category_endpoint;
pub use list::list_categories_endpoint;
