//! Statically typed commercial vehicle unit.
//!
//! The sort key discriminator is the location id, so one account partition holds
//! the units of all of its locations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::SchemaRegistry;
use crate::storage::{RepositoryError, Result};

use super::dynamic::{ACCOUNT_ID, UNIT_TYPE};
use super::keys::{PARTITION_KEY, SORT_KEY};
use super::record::{get_string, write_key, Item, Timestamps, UnitRecord};

/// Unit type recorded on every fixed-schema item.
pub const FIXED_UNIT_TYPE: &str = "commercialVehicleType";

/// Free-form name/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedAttribute {
    pub attribute_name: String,
    pub attribute_value: String,
}

/// ACES attribute: name/value pair plus the ACES key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcesAttribute {
    pub attribute_name: String,
    pub attribute_value: String,
    pub attribute_key: String,
}

/// A commercial vehicle type unit with a fixed attribute set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedUnit {
    pub id: String,
    pub account_id: String,
    pub location_id: String,

    #[serde(flatten)]
    pub vehicle: VehicleAttributes,

    #[serde(flatten)]
    pub timestamps: Timestamps,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extended_attributes: Vec<ExtendedAttribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aces_attributes: Vec<AcesAttribute>,
}

/// Decoded vehicle description. Every value is kept as text, as decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleAttributes {
    // Core identification
    pub suggested_vin: String,
    pub error_code: String,
    pub possible_values: String,
    pub error_text: String,
    pub vehicle_descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_error_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_market: Option<String>,
    pub note: String,

    // Basic info
    pub make: String,
    pub manufacturer_name: String,
    pub model: String,
    pub model_year: String,
    pub series: String,
    pub vehicle_type: String,

    // Plant
    pub plant_city: String,
    pub plant_country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant_company_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series2: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_land_use: Option<String>,

    // Body
    pub body_class: String,
    pub doors: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel_base_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_width_inches: Option<String>,

    // Weight
    pub gross_vehicle_weight_rating_from: String,
    pub gross_vehicle_weight_rating_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_combination_weight_rating_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_combination_weight_rating_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curb_weight_pounds: Option<String>,

    // Dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_length_inches: Option<String>,
    pub wheel_base_inches_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel_base_inches_to: Option<String>,

    // Truck and trailer
    pub bed_type: String,
    pub cab_type: String,
    pub trailer_type_connection: String,
    pub trailer_body_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_length_feet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_trailer_info: Option<String>,

    // Wheels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_wheels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel_size_front_inches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel_size_rear_inches: Option<String>,

    // Motorcycle
    pub custom_motorcycle_type: String,
    pub motorcycle_suspension_type: String,
    pub motorcycle_chassis_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_motorcycle_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_tank_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_tank_material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_braking_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheelie_mitigation: Option<String>,

    // Bus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_length_feet: Option<String>,
    pub bus_floor_configuration_type: String,
    pub bus_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_bus_info: Option<String>,

    // Interior
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entertainment_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steering_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_seats: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_seat_rows: Option<String>,

    // Drivetrain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_speeds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axle_configuration: Option<String>,

    // Brakes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brake_system_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brake_system_description: Option<String>,

    // Battery and charging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_battery_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_battery_cells_per_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_current_amps_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage_volts_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_energy_kwh_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_drive_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_current_amps_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage_volts_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_energy_kwh_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_battery_modules_per_pack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_battery_packs_per_vehicle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_power_kw: Option<String>,

    // Engine
    pub engine_number_of_cylinders: String,
    pub displacement_cc: String,
    pub displacement_ci: String,
    pub displacement_l: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_stroke_cycles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_power_kw: Option<String>,
    pub fuel_type_primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valve_train_design: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type_secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_delivery_fuel_injection_type: Option<String>,
    pub engine_brake_hp_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_brake_hp_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrification_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_engine_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_speed_mph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_manufacturer: Option<String>,

    // Restraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretensioner: Option<String>,
    pub seat_belt_type: String,
    pub other_restraint_system_info: String,

    // Airbags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curtain_air_bag_locations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_cushion_air_bag_locations: Option<String>,
    pub front_air_bag_locations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knee_air_bag_locations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_air_bag_locations: Option<String>,

    // Electronic safety
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_lock_braking_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electronic_stability_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traction_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tire_pressure_monitoring_system_type: Option<String>,

    // Active safety
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_safety_system_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reverse_system_for_windows_and_sunroofs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_pedestrian_alerting_sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data_recorder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyless_ignition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sae_automation_level_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sae_automation_level_to: Option<String>,

    // Driver assistance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_cruise_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_imminent_braking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_collision_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_brake_support: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pedestrian_automatic_emergency_braking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blind_spot_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_departure_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_keeping_assistance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blind_spot_intervention: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_centering_assistance: Option<String>,

    // Parking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_camera: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_assist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rear_cross_traffic_alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rear_automatic_emergency_braking: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_crash_notification: Option<String>,

    // Lighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daytime_running_light: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headlamp_light_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semiautomatic_headlamp_beam_switching: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_driving_beam: Option<String>,
}

impl FixedUnit {
    pub fn new(account_id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            location_id: location_id.into(),
            ..Self::default()
        }
    }

    /// Sets a specific ID for this unit (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_vehicle(mut self, vehicle: VehicleAttributes) -> Self {
        self.vehicle = vehicle;
        self
    }

    /// Checks that the location id is present and a valid UUID.
    pub fn validate_location_id(&self) -> Result<()> {
        if self.location_id.is_empty() {
            return Err(RepositoryError::Validation("locationId is required".into()));
        }
        Uuid::parse_str(&self.location_id).map_err(|e| {
            RepositoryError::Validation(format!("locationId must be a valid UUID: {e}"))
        })?;
        Ok(())
    }
}

impl UnitRecord for FixedUnit {
    const ENTITY_TYPE: &'static str = "Unit";

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn discriminator(&self) -> &str {
        &self.location_id
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn validate(&mut self, _schemas: &SchemaRegistry) -> Result<()> {
        if self.account_id.is_empty() {
            return Err(RepositoryError::Validation("accountId is required".into()));
        }
        self.validate_location_id()
    }

    fn to_item(&self) -> Result<Item> {
        let key = self.key()?;
        let mut item = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(RepositoryError::Serialization(format!(
                    "unit serialized to a non-object: {other}"
                )))
            }
            Err(e) => return Err(RepositoryError::Serialization(e.to_string())),
        };

        // The account lives in the partition key
        item.remove(ACCOUNT_ID);
        write_key(&mut item, &key);
        item.insert(
            UNIT_TYPE.to_string(),
            Value::String(FIXED_UNIT_TYPE.to_string()),
        );
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<Self> {
        let mut fields = item.clone();
        let account_id = get_string(item, PARTITION_KEY)?;
        fields.remove(PARTITION_KEY);
        fields.remove(SORT_KEY);
        fields.remove(UNIT_TYPE);
        fields.insert(ACCOUNT_ID.to_string(), Value::String(account_id));

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LOCATION: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn sample_unit() -> FixedUnit {
        let vehicle = VehicleAttributes {
            suggested_vin: "1HGBH41JXMN109186".to_string(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            trim: Some("EX".to_string()),
            ..VehicleAttributes::default()
        };
        let mut unit = FixedUnit::new("account-456", LOCATION)
            .with_id("test-id-123")
            .with_vehicle(vehicle);
        unit.extended_attributes.push(ExtendedAttribute {
            attribute_name: "color".to_string(),
            attribute_value: "red".to_string(),
        });
        unit.aces_attributes.push(AcesAttribute {
            attribute_name: "BaseVehicle".to_string(),
            attribute_value: "Civic".to_string(),
            attribute_key: "1234".to_string(),
        });
        unit.timestamps = Timestamps {
            created_at: 1_640_995_200,
            updated_at: 1_640_995_200,
            deleted_at: 0,
        };
        unit
    }

    #[test]
    fn test_key_uses_location_then_id() {
        let key = sample_unit().key().unwrap();
        assert_eq!(key.partition_key, "account-456");
        assert_eq!(key.sort_key, format!("{LOCATION}#test-id-123"));
    }

    #[test]
    fn test_to_item_layout() {
        let item = sample_unit().to_item().unwrap();
        assert_eq!(item["pk"], json!("account-456"));
        assert_eq!(item["sk"], json!(format!("{LOCATION}#test-id-123")));
        assert_eq!(item["locationId"], json!(LOCATION));
        assert_eq!(item["unitType"], json!(FIXED_UNIT_TYPE));
        assert_eq!(item["suggestedVin"], json!("1HGBH41JXMN109186"));
        assert_eq!(item["trim"], json!("EX"));
        assert_eq!(item["createdAt"], json!(1_640_995_200));
        assert!(!item.contains_key("accountId"));
        // Unset optional attributes are omitted
        assert!(!item.contains_key("trim2"));
        assert_eq!(
            item["acesAttributes"],
            json!([{ "attributeName": "BaseVehicle", "attributeValue": "Civic", "attributeKey": "1234" }])
        );
    }

    #[test]
    fn test_item_round_trip() {
        let unit = sample_unit();
        let parsed = FixedUnit::from_item(&unit.to_item().unwrap()).unwrap();
        assert_eq!(parsed, unit);
    }

    #[test]
    fn test_from_item_requires_partition_key() {
        let item = json!({ "sk": "loc#id", "id": "id" });
        assert!(FixedUnit::from_item(item.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_validate_location_id() {
        let schemas = SchemaRegistry::new();

        let mut valid = sample_unit();
        assert!(valid.validate(&schemas).is_ok());

        let mut missing = FixedUnit::new("account-456", "");
        assert!(matches!(
            missing.validate(&schemas),
            Err(RepositoryError::Validation(msg)) if msg == "locationId is required"
        ));

        let mut invalid = FixedUnit::new("account-456", "not-a-uuid");
        assert!(matches!(
            invalid.validate(&schemas),
            Err(RepositoryError::Validation(msg)) if msg.starts_with("locationId must be a valid UUID")
        ));
    }

    #[test]
    fn test_document_uses_camel_case() {
        let doc = sample_unit().to_document();
        assert_eq!(doc["accountId"], json!("account-456"));
        assert_eq!(doc["manufacturerName"], json!(""));
        assert_eq!(doc["extendedAttributes"][0]["attributeName"], json!("color"));
    }
}
