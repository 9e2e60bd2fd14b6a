use serde_json::Value;

use crate::errors::RecordError;

const FIELD_ID: &str = "Id";
const FIELD_PRODUCT: &str = "Product2Id";
const FIELD_QUANTITY: &str = "Quantity";
const FIELD_UNIT_PRICE: &str = "UnitPrice";
const FIELD_PRICEBOOK_ENTRY: &str = "PricebookEntryId";
const FIELD_DISCOUNT_OVERRIDE: &str = "Discount__c";

/// One product line on a CRM opportunity, as returned by the line-item
/// query.
#[derive(Clone, Debug, PartialEq)]
pub struct OpportunityLineItem {
    pub id: String,
    pub product_id: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub pricebook_entry_id: String,
    /// Per-line discount percentage (0-100). Only populated when the
    /// override field was part of the query.
    pub discount_override: Option<f64>,
}

impl OpportunityLineItem {
    /// Field list for the line-item query. The override column is a custom
    /// field and is only selected when overrides are enabled.
    pub fn query_fields(include_override: bool) -> Vec<&'static str> {
        let mut fields = vec![
            FIELD_ID,
            FIELD_PRODUCT,
            FIELD_QUANTITY,
            FIELD_UNIT_PRICE,
            FIELD_PRICEBOOK_ENTRY,
        ];
        if include_override {
            fields.push(FIELD_DISCOUNT_OVERRIDE);
        }
        fields
    }

    /// Builds a line item from one query row. Numeric fields arrive as JSON
    /// numbers or as numeric strings depending on the CRM serializer, so
    /// both are accepted.
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        Ok(Self {
            id: string_field(record, FIELD_ID)?,
            product_id: string_field(record, FIELD_PRODUCT)?,
            quantity: numeric_field(record, FIELD_QUANTITY)?,
            unit_price: numeric_field(record, FIELD_UNIT_PRICE)?,
            pricebook_entry_id: string_field(record, FIELD_PRICEBOOK_ENTRY)?,
            discount_override: optional_numeric_field(record, FIELD_DISCOUNT_OVERRIDE)?,
        })
    }
}

fn string_field(record: &Value, field: &'static str) -> Result<String, RecordError> {
    match record.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(RecordError::MissingField(field)),
    }
}

fn numeric_field(record: &Value, field: &'static str) -> Result<f64, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(value) => parse_numeric(value, field),
    }
}

fn optional_numeric_field(record: &Value, field: &'static str) -> Result<Option<f64>, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_numeric(value, field).map(Some),
    }
}

fn parse_numeric(value: &Value, field: &'static str) -> Result<f64, RecordError> {
    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| RecordError::MalformedNumber {
            field,
            value: number.to_string(),
        }),
        Value::String(raw) => raw.trim().parse::<f64>().map_err(|_| {
            RecordError::MalformedNumber { field, value: raw.clone() }
        }),
        other => Err(RecordError::MalformedNumber { field, value: other.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::errors::RecordError;

    use super::OpportunityLineItem;

    fn record() -> serde_json::Value {
        json!({
            "Id": "00kxx0000001",
            "Product2Id": "01txx0000001",
            "Quantity": 2.0,
            "UnitPrice": 100.0,
            "PricebookEntryId": "01uxx0000001",
        })
    }

    #[test]
    fn query_fields_append_the_override_column_only_when_enabled() {
        let base = OpportunityLineItem::query_fields(false);
        assert_eq!(base, vec!["Id", "Product2Id", "Quantity", "UnitPrice", "PricebookEntryId"]);

        let with_override = OpportunityLineItem::query_fields(true);
        assert_eq!(with_override.last(), Some(&"Discount__c"));
        assert_eq!(with_override.len(), base.len() + 1);
    }

    #[test]
    fn parses_a_plain_record() {
        let line = OpportunityLineItem::from_record(&record()).expect("record should parse");
        assert_eq!(line.id, "00kxx0000001");
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.unit_price, 100.0);
        assert_eq!(line.discount_override, None);
    }

    #[test]
    fn accepts_numeric_strings_for_number_fields() {
        let mut record = record();
        record["Quantity"] = serde_json::Value::String("2".to_string());
        record["UnitPrice"] = serde_json::Value::String("100.5".to_string());

        let line = OpportunityLineItem::from_record(&record).expect("record should parse");
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.unit_price, 100.5);
    }

    #[test]
    fn reads_the_discount_override_when_present() {
        let mut record = record();
        record["Discount__c"] = serde_json::json!(20.0);

        let line = OpportunityLineItem::from_record(&record).expect("record should parse");
        assert_eq!(line.discount_override, Some(20.0));
    }

    #[test]
    fn null_override_reads_as_absent() {
        let mut record = record();
        record["Discount__c"] = serde_json::Value::Null;

        let line = OpportunityLineItem::from_record(&record).expect("record should parse");
        assert_eq!(line.discount_override, None);
    }

    #[test]
    fn missing_quantity_is_a_record_error() {
        let mut record = record();
        record.as_object_mut().expect("object").remove("Quantity");

        let error = OpportunityLineItem::from_record(&record).expect_err("parse should fail");
        assert_eq!(error, RecordError::MissingField("Quantity"));
    }

    #[test]
    fn malformed_unit_price_is_a_record_error() {
        let mut record = record();
        record["UnitPrice"] = serde_json::Value::String("not-a-number".to_string());

        let error = OpportunityLineItem::from_record(&record).expect_err("parse should fail");
        assert!(matches!(error, RecordError::MalformedNumber { field: "UnitPrice", .. }));
    }
}
