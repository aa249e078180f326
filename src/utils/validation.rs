// Validation utilities
use crate::error::{Error, Result};

// Display and storage cap for user-supplied names
const MAX_NAME_LENGTH: usize = 255;

fn validate_required_name(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} cannot be empty")));
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "{what} cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Validate a recipe name
pub fn validate_recipe_name(name: &str) -> Result<()> {
    validate_required_name(name, "Recipe name")
}

/// Validate a category name
pub fn validate_category_name(name: &str) -> Result<()> {
    validate_required_name(name, "Category name")
}

/// Validate an ingredient name
pub fn validate_ingredient_name(name: &str) -> Result<()> {
    validate_required_name(name, "Ingredient name")
}

/// Validate an ingredient quantity. Quantities are free-form and may be empty.
pub fn validate_quantity(quantity: &str) -> Result<()> {
    if quantity.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Quantity cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Validate step instructions
pub fn validate_instructions(instructions: &str) -> Result<()> {
    if instructions.trim().is_empty() {
        return Err(Error::Validation(
            "Step instructions cannot be empty".to_string(),
        ));
    }

    Ok(())
}
