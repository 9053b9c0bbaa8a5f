use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{Error, Result};
use crate::polygon::Ring;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Green,
    Residential,
    Industrial,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterKind {
    /// Slider over an inclusive range.
    Range { min: f64, max: f64 },
    /// Checkbox.
    Flag,
    /// Multi-select over a fixed catalogue.
    Choices(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ParameterKind,
}

/// Everything the simulation needs to know about a zone classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneSpec {
    pub kind: ZoneKind,
    pub name: &'static str,
    pub preset: &'static str,
    pub color: &'static str,
    pub parameters: &'static [ParameterSpec],
}

const fn range(key: &'static str, label: &'static str, min: f64, max: f64) -> ParameterSpec {
    ParameterSpec {
        key,
        label,
        kind: ParameterKind::Range { min, max },
    }
}

pub const INDUSTRIES: &[&str] = &[
    "Electricity Generation",
    "Adipic Acid Production",
    "Aluminum Production",
    "Ammonia Manufacturing",
    "Cement Production",
    "Electronics Manufacture",
    "Ferroalloy Production",
    "Fluorinated GHG Production",
    "Glass Production",
    "HCFC-22 Production and HFC-23 Destruction",
    "Hydrogen Production",
    "Iron and Steel Production",
    "Lead Production",
    "Lime Production",
    "Magnesium Production",
    "Miscellaneous Use of Carbonates",
    "Nitric Acid Production",
    "Petrochemical Production",
    "Petroleum Refining",
    "Phosphoric Acid Production",
    "Pulp and Paper Manufacturing",
    "Silicon Carbide Production",
    "Soda Ash Manufacturing",
    "SF6 from Electrical Equipment",
    "Titanium Dioxide Production",
    "Underground Coal Mines",
    "Zinc Production",
    "Municipal Landfills",
    "Industrial Wastewater Treatment",
    "Industrial Waste Landfills",
    "Offshore Production",
    "Natural Gas Processing",
    "Natural Gas Transmission/Compression",
    "Underground Natural Gas Storage",
    "Liquified Natural Gas Storage",
    "Liquified Natural Gas Import/Export Equipment",
    "Petroleum Refinery (Producer)",
    "Petroleum Product Importer",
    "Petroleum Product Exporter",
    "Natural Gas Liquids Fractionator",
    "Natural Gas Local Distribution Company (supply)",
    "Non-CO2 Industrial Gas Supply",
    "Carbon Dioxide (CO2) Supply",
    "Import and Export of Equipment Containing Fluorinated GHGs",
    "Injection of Carbon Dioxide",
    "Electric Transmission and Distribution Equipment",
];

const GREEN: ZoneSpec = ZoneSpec {
    kind: ZoneKind::Green,
    name: "Green Zone",
    preset: "green_area",
    color: "#10B981",
    parameters: &[
        range("arboles", "Amount of trees (trees/ha)", 0.0, 1000.0),
        range("pasto", "Grass cover (%)", 0.0, 100.0),
        ParameterSpec {
            key: "agua",
            label: "Water body in the zone",
            kind: ParameterKind::Flag,
        },
        range("copa", "Tree canopy cover (%)", 0.0, 100.0),
    ],
};

const RESIDENTIAL: ZoneSpec = ZoneSpec {
    kind: ZoneKind::Residential,
    name: "Residential Zone",
    preset: "residential",
    color: "#F59E0B",
    parameters: &[
        range("densidad", "Building density (buildings/km²)", 0.0, 100.0),
        range("trafico", "Estimated traffic (vehicles/day)", 0.0, 1000.0),
        range("albedo", "Surface albedo", 0.0, 1.0),
    ],
};

const INDUSTRIAL: ZoneSpec = ZoneSpec {
    kind: ZoneKind::Industrial,
    name: "Industrial Zone",
    preset: "industrial",
    color: "#6366F1",
    parameters: &[
        range("ch4", "CH4 emissions (m³)", 0.0, 25000.0),
        range("c02", "CO2 emissions (m³)", 0.0, 25000.0),
        range("n2o", "N2O emissions (m³)", 0.0, 25000.0),
        ParameterSpec {
            key: "industries_used",
            label: "Type of industry",
            kind: ParameterKind::Choices(INDUSTRIES),
        },
    ],
};

pub static ZONE_SPECS: [ZoneSpec; 3] = [GREEN, RESIDENTIAL, INDUSTRIAL];

impl ZoneKind {
    pub const ALL: [ZoneKind; 3] = [ZoneKind::Green, ZoneKind::Residential, ZoneKind::Industrial];

    pub fn spec(&self) -> &'static ZoneSpec {
        match self {
            ZoneKind::Green => &ZONE_SPECS[0],
            ZoneKind::Residential => &ZONE_SPECS[1],
            ZoneKind::Industrial => &ZONE_SPECS[2],
        }
    }

    pub fn preset(&self) -> &'static str {
        self.spec().preset
    }

    /// Allow-list lookup.
    pub fn parameter(&self, key: &str) -> Option<&'static ParameterSpec> {
        self.spec().parameters.iter().find(|p| p.key == key)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ZoneKind::Green => "green",
            ZoneKind::Residential => "residential",
            ZoneKind::Industrial => "industrial",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ZoneKind {
    type Err = Error;

    /// Accepts the short names, the "<name> zone" labels of the drawing UI
    /// and its Spanish keys.
    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim().to_lowercase();
        let t = t.strip_suffix(" zone").unwrap_or(&t);
        match t {
            "green" | "verde" => Ok(ZoneKind::Green),
            "residential" | "residencial" => Ok(ZoneKind::Residential),
            "industrial" => Ok(ZoneKind::Industrial),
            _ => Err(Error::UnknownZone(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Flag(bool),
    Number(f64),
    List(Vec<String>),
    /// Any other JSON value. Kept so a shared store can carry keys no zone
    /// kind knows; rejected by [`ParameterSpec::check`].
    Other(Value),
}

impl ParameterValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Flag(_) => "boolean",
            ParameterValue::Number(_) => "number",
            ParameterValue::List(_) => "list",
            ParameterValue::Other(Value::Null) => "null",
            ParameterValue::Other(Value::String(_)) => "string",
            ParameterValue::Other(_) => "json value",
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ParameterValue::Flag(b) => Value::Bool(*b),
            // finiteness is checked before conversion
            ParameterValue::Number(n) => Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ParameterValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ParameterValue::Other(v) => v.clone(),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Number(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Flag(v)
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(v: Vec<String>) -> Self {
        ParameterValue::List(v)
    }
}

impl ParameterSpec {
    pub fn check(&self, value: &ParameterValue) -> Result<()> {
        match (self.kind, value) {
            (ParameterKind::Range { min, max }, ParameterValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(Error::parameter(self.key, "not a finite number"));
                }
                if *n < min || *n > max {
                    return Err(Error::parameter(
                        self.key,
                        format!("{} outside [{}, {}]", n, min, max),
                    ));
                }
                Ok(())
            }
            (ParameterKind::Flag, ParameterValue::Flag(_)) => Ok(()),
            (ParameterKind::Choices(catalogue), ParameterValue::List(items)) => {
                match items.iter().find(|i| !catalogue.contains(&i.as_str())) {
                    Some(unknown) => Err(Error::parameter(
                        self.key,
                        format!("unknown choice {:?}", unknown),
                    )),
                    None => Ok(()),
                }
            }
            (kind, v) => Err(Error::parameter(
                self.key,
                format!("expected {}, got {}", kind.type_name(), v.type_name()),
            )),
        }
    }
}

impl ParameterKind {
    fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::Range { .. } => "number",
            ParameterKind::Flag => "boolean",
            ParameterKind::Choices(_) => "list",
        }
    }
}

/// Parameter values by name. The store may be shared across zone kinds;
/// [`ParameterSet::filtered`] keeps what a given kind accepts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(pub BTreeMap<String, ParameterValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParameterValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values whose keys are legal for `kind`, as GeoJSON properties. Keys of
    /// other kinds are dropped silently; a legal key holding the wrong kind
    /// of value is an `InvalidParameter` error.
    pub fn filtered(&self, kind: ZoneKind) -> Result<JsonObject> {
        let mut ret = JsonObject::new();
        for (key, value) in &self.0 {
            if let Some(spec) = kind.parameter(key) {
                spec.check(value)?;
                ret.insert(key.clone(), value.to_json());
            }
        }
        Ok(ret)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: Option<u64>,
    pub kind: ZoneKind,
    pub ring: Ring,
    pub parameters: ParameterSet,
}

impl Zone {
    pub fn new(kind: ZoneKind, ring: Ring) -> Self {
        Zone {
            id: None,
            kind,
            ring,
            parameters: ParameterSet::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }
}
