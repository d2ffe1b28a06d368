//! Raw symbol class names, their merged "general" classes and stable IDs.
//!
//! The raw vocabulary is matched against symbol file names. Directional and
//! positional variants are collapsed through [`CLASS_GROUPS`], and the
//! resulting general names are numbered in alphabetical order.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;

use crate::error::LayoutError;

/// Raw class tokens, in priority order for equal-length matches.
pub const RAW_CLASSES: [&str; 67] = [
    "shut-off_valve_on",
    "shut-off_valve_off",
    "pump_on_up",
    "pump_on_right",
    "pump_on_left",
    "pump_on_down",
    "pump_off_up",
    "pump_off_right",
    "pump_off_left",
    "pump_off_down",
    "metering_device",
    "frequency_inverter_on",
    "frequency_inverter_off",
    "digital_volume_sensor_on",
    "digital_volume_sensor_off",
    "digital_temperature_sensor",
    "digital_relative_humidity_sensor",
    "digital_differential_pressure_sensor",
    "digital_absolute_humidity_sensor",
    "differential_pressure_sensor",
    "analog_pressure_sensor",
    "analogue_relative_humidity_sensor",
    "3-way-control_valve",
    "2-way-control_valve",
    "chiller",
    "chiller_off",
    "chiller_on",
    "combined_coarse_fine_filter_right",
    "constant_volume_flow_controller_left",
    "constant_volume_flow_controller_right",
    "consumer",
    "cooling_coil",
    "damper_off",
    "discharge_well",
    "electical_heater",
    "electrical_air_damper_on",
    "electrical_hot_water_storage_tank",
    "exhaust_air_combined_fine_coarse_filter_left",
    "fan_on_left",
    "fan_on_left_1",
    "fan_on_right",
    "fan_on_right_1",
    "fan_on_right_2",
    "fan_right",
    "filter_left",
    "filter_right",
    "fine_filter",
    "heat_exchanger",
    "heat_exchanger_ventilation_system",
    "heating_coil",
    "inlet_vane_controlled_fan_off_left",
    "inlet_vane_controlled_fan_off_right",
    "inlet_vane_controlled_fan_on_left_1",
    "inlet_vane_controlled_fan_on_right_1",
    "pressurization_system",
    "rooftop_chiller_unit",
    "room_switch_off",
    "room_switch_on",
    "rotary_heat_exchanger",
    "steam_humidifer",
    "steam_humidifier_off",
    "steam_humidifier_on",
    "variable_volume_flow_controller_left",
    "variable_volume_flow_controller_right",
    "vertical_heat_exchanger_heating_cooling",
    "water_storage_tank",
    "water_storage_tank_1",
];

/// Raw name -> general name. Names not listed map to themselves.
pub const CLASS_GROUPS: [(&str, &str); 27] = [
    ("pump_on_up", "pump_on"),
    ("pump_on_right", "pump_on"),
    ("pump_on_left", "pump_on"),
    ("pump_on_down", "pump_on"),
    ("pump_off_up", "pump_off"),
    ("pump_off_right", "pump_off"),
    ("pump_off_left", "pump_off"),
    ("pump_off_down", "pump_off"),
    ("fan_on_left", "fan_on"),
    ("fan_on_left_1", "fan_on"),
    ("fan_on_right", "fan_on"),
    ("fan_on_right_1", "fan_on"),
    ("fan_on_right_2", "fan_on"),
    ("fan_right", "fan_on"),
    ("filter_left", "filter"),
    ("filter_right", "filter"),
    (
        "combined_coarse_fine_filter_right",
        "combined_coarse_fine_filter",
    ),
    (
        "exhaust_air_combined_fine_coarse_filter_left",
        "combined_coarse_fine_filter",
    ),
    (
        "constant_volume_flow_controller_left",
        "constant_volume_flow_controller",
    ),
    (
        "constant_volume_flow_controller_right",
        "constant_volume_flow_controller",
    ),
    (
        "variable_volume_flow_controller_left",
        "variable_volume_flow_controller",
    ),
    (
        "variable_volume_flow_controller_right",
        "variable_volume_flow_controller",
    ),
    (
        "inlet_vane_controlled_fan_off_left",
        "inlet_vane_controlled_fan_off",
    ),
    (
        "inlet_vane_controlled_fan_off_right",
        "inlet_vane_controlled_fan_off",
    ),
    (
        "inlet_vane_controlled_fan_on_left_1",
        "inlet_vane_controlled_fan_on",
    ),
    (
        "inlet_vane_controlled_fan_on_right_1",
        "inlet_vane_controlled_fan_on",
    ),
    ("water_storage_tank_1", "water_storage_tank"),
];

static BUILTIN: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::new(&RAW_CLASSES, &CLASS_GROUPS));

/// Maps a raw class name to its general class using the built-in groups.
pub fn generalize(raw: &str) -> &str {
    BUILTIN.generalize(raw)
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    vocabulary: Vec<&'static str>,
    groups: HashMap<&'static str, &'static str>,
    names: Vec<&'static str>,
    ids: HashMap<&'static str, u32>,
}

impl Taxonomy {
    pub fn new(vocabulary: &[&'static str], groups: &[(&'static str, &'static str)]) -> Self {
        let groups: HashMap<_, _> = groups.iter().copied().collect();
        let names: Vec<&'static str> = vocabulary
            .iter()
            .map(|&raw| groups.get(raw).copied().unwrap_or(raw))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let ids = names
            .iter()
            .enumerate()
            .map(|(id, name)| (*name, id as u32))
            .collect();

        Self {
            vocabulary: vocabulary.to_vec(),
            groups,
            names,
            ids,
        }
    }

    /// Shared instance built from [`RAW_CLASSES`] and [`CLASS_GROUPS`].
    pub fn builtin() -> &'static Taxonomy {
        &BUILTIN
    }

    pub fn generalize<'a>(&self, raw: &'a str) -> &'a str {
        match self.groups.get(raw) {
            Some(general) => *general,
            None => raw,
        }
    }

    /// General class names, indexed by class ID.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn class_id(&self, general: &str) -> Option<u32> {
        self.ids.get(general).copied()
    }

    /// Finds the raw token contained in `stem`.
    ///
    /// The longest contained token wins, so `chiller_on` beats `chiller`.
    /// Equal lengths fall back to vocabulary order.
    pub fn match_token(&self, stem: &str) -> Option<&'static str> {
        self.vocabulary
            .iter()
            .copied()
            .filter(|token| stem.contains(token))
            .fold(None, |best: Option<&'static str>, token| match best {
                Some(b) if b.len() >= token.len() => Some(b),
                _ => Some(token),
            })
    }

    /// Resolves a symbol file name such as `pump_on_up_03.png` to a class ID.
    pub fn class_id_from_file_name(&self, file_name: &str) -> Result<u32, LayoutError> {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        self.match_token(stem)
            .and_then(|raw| self.class_id(self.generalize(raw)))
            .ok_or_else(|| LayoutError::UnknownClass(file_name.to_string()))
    }
}
