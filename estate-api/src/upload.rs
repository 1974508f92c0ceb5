//! Multipart payloads for creating and editing listings.

use crate::models::{ListingType, Property};
use estate_core::{FilePart, MultipartForm};

/// Unit a listing's area is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AreaUnit {
    /// Square yards (gaj).
    SqYd,
    /// Square feet.
    #[default]
    SqFt,
    /// Marla.
    Marla,
    /// Kanal.
    Kanal,
    /// Acre.
    Acre,
    /// Square metres.
    SqMtr,
}

impl AreaUnit {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaUnit::SqYd => "SQYD",
            AreaUnit::SqFt => "SQFT",
            AreaUnit::Marla => "MARLA",
            AreaUnit::Kanal => "KANAL",
            AreaUnit::Acre => "ACRE",
            AreaUnit::SqMtr => "SQMTR",
        }
    }

    /// Parse a display label or wire code. Unknown labels fall back to
    /// square feet.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Gaj" | "Sq. Yard" | "SQYD" => AreaUnit::SqYd,
            "Sq. Feet" | "SQFT" => AreaUnit::SqFt,
            "Marla" | "MARLA" => AreaUnit::Marla,
            "Kanal" | "KANAL" => AreaUnit::Kanal,
            "Acre" | "ACRE" => AreaUnit::Acre,
            "Sq. Meter" | "SQMTR" => AreaUnit::SqMtr,
            _ => AreaUnit::SqFt,
        }
    }
}

/// Fields of a listing to create or change.
///
/// For creation every set field is sent. For edits, build the upload with
/// [`PropertyUpload::changes_from`] so only fields that differ from the
/// current listing go over the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpload {
    /// Title.
    pub title: Option<String>,
    /// Price in rupees.
    pub price: Option<f64>,
    /// Description.
    pub description: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Sale or rent.
    pub listing_type: Option<ListingType>,
    /// Property type, sent upper-cased.
    pub property_type: Option<String>,
    /// Area.
    pub area: Option<f64>,
    /// Area unit.
    pub unit: Option<AreaUnit>,
    /// Bedrooms.
    pub bedrooms: Option<u32>,
    /// Bathrooms.
    pub bathrooms: Option<u32>,
    /// Amenity ids. `None` leaves them unchanged.
    pub amenities: Option<Vec<u64>>,
    /// New images.
    pub images: Vec<FilePart>,
    /// Ids of existing images to remove (edits only).
    pub delete_images: Vec<u64>,
}

impl PropertyUpload {
    /// Create an empty upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the price.
    #[must_use]
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the city.
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set sale or rent.
    #[must_use]
    pub fn listing_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = Some(listing_type);
        self
    }

    /// Set the property type.
    #[must_use]
    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into().to_uppercase());
        self
    }

    /// Set the area and its unit.
    #[must_use]
    pub fn area(mut self, area: f64, unit: AreaUnit) -> Self {
        self.area = Some(area);
        self.unit = Some(unit);
        self
    }

    /// Set bedroom and bathroom counts.
    #[must_use]
    pub fn rooms(mut self, bedrooms: u32, bathrooms: u32) -> Self {
        self.bedrooms = Some(bedrooms);
        self.bathrooms = Some(bathrooms);
        self
    }

    /// Set the amenity ids.
    #[must_use]
    pub fn amenities(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.amenities = Some(ids.into_iter().collect());
        self
    }

    /// Attach a new image.
    #[must_use]
    pub fn image(mut self, part: FilePart) -> Self {
        self.images.push(part);
        self
    }

    /// Remove an existing image.
    #[must_use]
    pub fn delete_image(mut self, id: u64) -> Self {
        self.delete_images.push(id);
        self
    }

    /// Keep only the fields of `self` that differ from `current`.
    ///
    /// Images and image deletions are always kept. Amenities compare as sets.
    pub fn changes_from(self, current: &Property) -> Self {
        fn differs<T: PartialEq>(new: Option<T>, old: Option<T>) -> Option<T> {
            match new {
                Some(v) if Some(&v) != old.as_ref() => Some(v),
                _ => None,
            }
        }

        let amenities = self.amenities.and_then(|mut new| {
            let mut old = current.amenity_ids();
            new.sort_unstable();
            old.sort_unstable();
            (new != old).then_some(new)
        });
        let unit = self
            .unit
            .filter(|u| current.unit.as_deref() != Some(u.as_str()));

        Self {
            title: differs(self.title, current.title.clone()),
            price: differs(self.price, current.price),
            description: differs(self.description, current.description.clone()),
            address: differs(self.address, current.address.clone()),
            city: differs(self.city, current.city.clone()),
            listing_type: differs(self.listing_type, current.listing_type),
            property_type: differs(self.property_type, current.property_type.clone()),
            area: differs(self.area, current.area),
            unit,
            bedrooms: differs(self.bedrooms, current.bedrooms),
            bathrooms: differs(self.bathrooms, current.bathrooms),
            amenities,
            images: self.images,
            delete_images: self.delete_images,
        }
    }

    /// Whether nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.to_form().is_empty()
    }

    /// Encode as a multipart form.
    ///
    /// Amenities repeat the `amenities` field once per id and are omitted
    /// when empty. Image deletions are sent comma-separated in one field.
    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        let text = |form: MultipartForm, name: &str, value: Option<String>| match value {
            Some(v) => form.text(name, v),
            None => form,
        };

        form = text(form, "title", self.title.clone());
        form = text(form, "price", self.price.map(format_number));
        form = text(form, "description", self.description.clone());
        form = text(form, "address", self.address.clone());
        form = text(form, "city", self.city.clone());
        form = text(form, "listing_type", self.listing_type.map(|l| l.as_str().to_string()));
        form = text(form, "property_type", self.property_type.clone());
        form = text(form, "area", self.area.map(format_number));
        form = text(form, "unit", self.unit.map(|u| u.as_str().to_string()));
        form = text(form, "bedrooms", self.bedrooms.map(|n| n.to_string()));
        form = text(form, "bathrooms", self.bathrooms.map(|n| n.to_string()));

        if let Some(ref ids) = self.amenities {
            for id in ids {
                form = form.text("amenities", id.to_string());
            }
        }
        for image in &self.images {
            form = form.file("uploaded_images", image.clone());
        }
        if !self.delete_images.is_empty() {
            let ids: Vec<String> = self.delete_images.iter().map(u64::to_string).collect();
            form = form.text("delete_images", ids.join(","));
        }
        form
    }
}

// Whole numbers go out without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::FormValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn current() -> Property {
        serde_json::from_value(json!({
            "id": 7,
            "title": "Plot near canal",
            "price": "2500000.00",
            "city": "Sangrur",
            "listing_type": "SALE",
            "property_type": "PLOT",
            "area": "200",
            "unit": "SQYD",
            "amenities": [{"id": 3, "name": "Water"}, {"id": 1, "name": "Road"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_area_unit_labels() {
        assert_eq!(AreaUnit::from_label("Gaj"), AreaUnit::SqYd);
        assert_eq!(AreaUnit::from_label("Sq. Yard"), AreaUnit::SqYd);
        assert_eq!(AreaUnit::from_label("KANAL"), AreaUnit::Kanal);
        assert_eq!(AreaUnit::from_label("Bigha"), AreaUnit::SqFt);
    }

    #[test]
    fn test_create_form() {
        let upload = PropertyUpload::new()
            .title("Plot near canal")
            .price(2_500_000.0)
            .listing_type(ListingType::Sale)
            .property_type("plot")
            .area(200.0, AreaUnit::SqYd)
            .amenities([1, 3])
            .image(FilePart::new("photo_0.jpg", vec![1u8, 2]));

        let form = upload.to_form();
        assert_eq!(form.texts("price"), vec!["2500000"]);
        assert_eq!(form.texts("property_type"), vec!["PLOT"]);
        assert_eq!(form.texts("unit"), vec!["SQYD"]);
        assert_eq!(form.texts("amenities"), vec!["1", "3"]);
        assert!(form
            .fields
            .iter()
            .any(|(name, v)| name == "uploaded_images" && matches!(v, FormValue::File(_))));
        assert!(form.texts("delete_images").is_empty());
    }

    #[test]
    fn test_changes_only() {
        let edit = PropertyUpload::new()
            .title("Plot near canal")
            .price(2_600_000.0)
            .city("Sangrur")
            .area(200.0, AreaUnit::SqYd)
            .amenities([1, 3])
            .delete_image(11)
            .delete_image(12)
            .changes_from(&current());

        let form = edit.to_form();
        let names: Vec<&str> = form.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["price", "delete_images"]);
        assert_eq!(form.texts("delete_images"), vec!["11,12"]);
    }

    #[test]
    fn test_unchanged_edit_is_empty() {
        let edit = PropertyUpload::new()
            .title("Plot near canal")
            .price(2_500_000.0)
            .amenities([3, 1])
            .changes_from(&current());
        assert!(edit.is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(12.5), "12.5");
    }
}
