//! Reference data: locations, categories, sub-categories and vendors

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    inventory::tag::{checked_code, normalize_code},
    models::{
        category::{Category, CreateCategory, CreateSubCategory, SubCategory, UpdateCategory},
        location::{CreateLocation, Location, UpdateLocation},
        vendor::{CreateVendor, UpdateVendor, Vendor},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

/// Duplicate names or codes are a client conflict here, not an integrity fault
fn duplicate_as_conflict(err: AppError) -> AppError {
    match err {
        AppError::Integrity(msg) => AppError::Conflict(msg),
        other => other,
    }
}

/// Codes are stored upper-cased; a blank code is stored as NULL
fn normalized(code: &Option<String>) -> Option<String> {
    normalize_code(code.as_deref())
}

/// Location and category codes become tag segments
fn tag_segment(kind: &str, code: &Option<String>) -> AppResult<Option<String>> {
    checked_code(kind, code.as_deref())
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Locations

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.repository.locations.list().await
    }

    pub async fn get_location(&self, id: i32) -> AppResult<Location> {
        self.repository.locations.get_by_id(id).await
    }

    pub async fn create_location(&self, mut data: CreateLocation) -> AppResult<Location> {
        data.validate()?;
        data.code = tag_segment("Location", &data.code)?;
        let location = self
            .repository
            .locations
            .create(&data)
            .await
            .map_err(duplicate_as_conflict)?;
        tracing::info!(location_id = location.id, code = ?location.code, "Location created");
        Ok(location)
    }

    pub async fn update_location(&self, id: i32, mut data: UpdateLocation) -> AppResult<Location> {
        data.validate()?;
        data.code = tag_segment("Location", &data.code)?;
        self.repository
            .locations
            .update(id, &data)
            .await
            .map_err(duplicate_as_conflict)
    }

    // Categories

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn create_category(&self, mut data: CreateCategory) -> AppResult<Category> {
        data.validate()?;
        data.code = tag_segment("Category", &data.code)?;
        let category = self
            .repository
            .categories
            .create(&data)
            .await
            .map_err(duplicate_as_conflict)?;
        tracing::info!(category_id = category.id, code = ?category.code, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: i32, mut data: UpdateCategory) -> AppResult<Category> {
        data.validate()?;
        data.code = tag_segment("Category", &data.code)?;
        self.repository
            .categories
            .update(id, &data)
            .await
            .map_err(duplicate_as_conflict)
    }

    pub async fn list_subcategories(&self, category_id: i32) -> AppResult<Vec<SubCategory>> {
        self.repository.categories.get_by_id(category_id).await?;
        self.repository.categories.list_subcategories(category_id).await
    }

    pub async fn create_subcategory(&self, category_id: i32, data: CreateSubCategory) -> AppResult<SubCategory> {
        data.validate()?;
        self.repository.categories.get_by_id(category_id).await?;
        self.repository
            .categories
            .create_subcategory(category_id, &data)
            .await
            .map_err(duplicate_as_conflict)
    }

    pub async fn delete_subcategory(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete_subcategory(id).await
    }

    // Vendors

    pub async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
        self.repository.vendors.list().await
    }

    pub async fn get_vendor(&self, id: i32) -> AppResult<Vendor> {
        self.repository.vendors.get_by_id(id).await
    }

    pub async fn create_vendor(&self, mut data: CreateVendor) -> AppResult<Vendor> {
        data.validate()?;
        data.code = normalized(&data.code);
        let vendor = self
            .repository
            .vendors
            .create(&data)
            .await
            .map_err(duplicate_as_conflict)?;
        tracing::info!(vendor_id = vendor.id, name = %vendor.name, "Vendor created");
        Ok(vendor)
    }

    pub async fn update_vendor(&self, id: i32, mut data: UpdateVendor) -> AppResult<Vendor> {
        data.validate()?;
        data.code = normalized(&data.code);
        self.repository
            .vendors
            .update(id, &data)
            .await
            .map_err(duplicate_as_conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_normalized() {
        assert_eq!(normalized(&Some(" comp ".to_string())), Some("COMP".to_string()));
        assert_eq!(normalized(&Some("   ".to_string())), None);
        assert_eq!(normalized(&None), None);
    }

    #[test]
    fn test_tag_segment_codes_reject_dashes() {
        assert_eq!(tag_segment("Location", &Some(" m ".to_string())).unwrap(), Some("M".to_string()));
        let err = tag_segment("Category", &Some("it-eq".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("Category code 'IT-EQ'")));
    }

    #[test]
    fn test_duplicates_become_conflicts() {
        let err = duplicate_as_conflict(AppError::Integrity("locations_code_key".into()));
        assert!(matches!(err, AppError::Conflict(_)));
        let err = duplicate_as_conflict(AppError::NotFound("x".into()));
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
