// src/process/schema.rs

/// The canonical output columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    InvoiceAndItemNumber,
    Date,
    StoreNumber,
    StoreName,
    Address,
    City,
    ZipCode,
    County,
    CategoryName,
    VendorName,
    ItemNumber,
    ItemDescription,
    Pack,
    BottleVolumeMl,
    StateBottleCost,
    StateBottleRetail,
    BottlesSold,
    SaleDollars,
    VolumeSoldLiters,
}

pub const FIELD_COUNT: usize = 19;

/// Incidental geolocation column some responses carry.
pub const GEO_COLUMN: &str = "store_location";

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::InvoiceAndItemNumber,
        Field::Date,
        Field::StoreNumber,
        Field::StoreName,
        Field::Address,
        Field::City,
        Field::ZipCode,
        Field::County,
        Field::CategoryName,
        Field::VendorName,
        Field::ItemNumber,
        Field::ItemDescription,
        Field::Pack,
        Field::BottleVolumeMl,
        Field::StateBottleCost,
        Field::StateBottleRetail,
        Field::BottlesSold,
        Field::SaleDollars,
        Field::VolumeSoldLiters,
    ];

    /// Coerced to numbers; anything unparseable becomes missing.
    pub const NUMERIC: [Field; 7] = [
        Field::SaleDollars,
        Field::BottlesSold,
        Field::VolumeSoldLiters,
        Field::StateBottleCost,
        Field::StateBottleRetail,
        Field::Pack,
        Field::BottleVolumeMl,
    ];

    /// Free text that gets line breaks collapsed, upper-cased and trimmed.
    pub const TEXT: [Field; 6] = [
        Field::Address,
        Field::StoreName,
        Field::City,
        Field::VendorName,
        Field::CategoryName,
        Field::ItemDescription,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the output file.
    pub fn name(self) -> &'static str {
        match self {
            Field::InvoiceAndItemNumber => "invoice_and_item_number",
            Field::Date => "date",
            Field::StoreNumber => "store_number",
            Field::StoreName => "store_name",
            Field::Address => "address",
            Field::City => "city",
            Field::ZipCode => "zip_code",
            Field::County => "county",
            Field::CategoryName => "category_name",
            Field::VendorName => "vendor_name",
            Field::ItemNumber => "item_number",
            Field::ItemDescription => "item_description",
            Field::Pack => "pack",
            Field::BottleVolumeMl => "bottle_volume_ml",
            Field::StateBottleCost => "state_bottle_cost",
            Field::StateBottleRetail => "state_bottle_retail",
            Field::BottlesSold => "bottles_sold",
            Field::SaleDollars => "sale_dollars",
            Field::VolumeSoldLiters => "volume_sold_liters",
        }
    }

    /// Field name as the API returns it.
    pub fn source_name(self) -> &'static str {
        match self {
            Field::InvoiceAndItemNumber => "invoice_line_no",
            Field::Date => "date",
            Field::StoreNumber => "store",
            Field::StoreName => "name",
            Field::Address => "address",
            Field::City => "city",
            Field::ZipCode => "zipcode",
            Field::County => "county",
            Field::CategoryName => "category_name",
            Field::VendorName => "vendor_name",
            Field::ItemNumber => "itemno",
            Field::ItemDescription => "im_desc",
            Field::Pack => "pack",
            Field::BottleVolumeMl => "bottle_volume_ml",
            Field::StateBottleCost => "state_bottle_cost",
            Field::StateBottleRetail => "state_bottle_retail",
            Field::BottlesSold => "sale_bottles",
            Field::SaleDollars => "sale_dollars",
            Field::VolumeSoldLiters => "sale_liters",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn from_source_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.source_name() == name)
    }
}

/// Map a source column name to its canonical name; unknown names pass through.
pub fn rename(source: &str) -> &str {
    Field::from_source_name(source).map_or(source, |f| f.name())
}

/// Comma-separated source columns for the `$select` clause.
pub fn select_clause() -> String {
    Field::ALL
        .iter()
        .map(|f| f.source_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_output_order() {
        for (i, f) in Field::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn rename_maps_known_and_keeps_unknown() {
        assert_eq!(rename("invoice_line_no"), "invoice_and_item_number");
        assert_eq!(rename("im_desc"), "item_description");
        assert_eq!(rename("sale_liters"), "volume_sold_liters");
        assert_eq!(rename("store_location"), "store_location");
    }

    #[test]
    fn rename_passes_through_borrowed_names() {
        let owned = String::from("some_extra_column");
        let renamed = rename(&owned);
        assert_eq!(renamed, "some_extra_column");
        let owned = String::from("zipcode");
        assert_eq!(rename(&owned), "zip_code");
    }

    #[test]
    fn select_lists_all_source_fields() {
        let sel = select_clause();
        assert!(sel.starts_with("invoice_line_no, date, store, name"));
        assert_eq!(sel.split(", ").count(), FIELD_COUNT);
    }
}
