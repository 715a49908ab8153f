//! YAML-readable types

use std::convert::TryFrom;
use yaml_rust::yaml::Yaml;
use evalexpr::{HashMapContext, eval_number_with_context};

use crate::geometry::ThreeVector;

/// Types that can be parsed from a YML-formatted file
pub trait FromYaml: Sized {
    type Error;
    /// Attempt to parse the YML field as the specified type, using the supplied Context for named variables and constants.
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error>;
}

/// Plain numbers are parsed directly, everything else is handed to
/// the expression evaluator.
fn evaluate(s: &str, ctx: &HashMapContext) -> Result<f64, ()> {
    s.trim().parse::<f64>()
        .or_else(|_| eval_number_with_context(s, ctx))
        .or(Err(()))
}

// Atomic

impl FromYaml for bool {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Boolean(b) => Ok(b),
            _ => Err(())
        }
    }
}

impl FromYaml for String {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::String(s) => Ok(s),
            Yaml::Integer(i) => Ok(i.to_string()),
            Yaml::Real(s) => Ok(s),
            Yaml::Boolean(b) => Ok(b.to_string()),
            _ => Err(())
        }
    }
}

// Numbers: f64, i64, usize

impl FromYaml for f64 {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Real(s) => s.parse::<f64>().or(Err(())),
            Yaml::Integer(i) => Ok(i as f64),
            Yaml::String(s) => evaluate(&s, ctx),
            _ => Err(())
        }
    }
}

impl FromYaml for i64 {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            Yaml::Integer(i) => Ok(i),
            _ => Err(())
        }
    }
}

impl FromYaml for usize {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        let i: i64 = FromYaml::from_yaml(arg, ctx)?;
        usize::try_from(i).map_err(|_| ())
    }
}

impl FromYaml for u64 {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        let i: i64 = FromYaml::from_yaml(arg, ctx)?;
        u64::try_from(i).map_err(|_| ())
    }
}

// Vecs

impl FromYaml for Vec<String> {
    type Error = ();
    fn from_yaml(arg: Yaml, _ctx: &HashMapContext) -> Result<Self, Self::Error> {
        match arg {
            // turn a single String into a vec of length 1.
            Yaml::String(s) | Yaml::Real(s) => {
                Ok(vec![s])
            },
            Yaml::Integer(i) =>  {
                Ok(vec![i.to_string()])
            },
            Yaml::Array(array) => {
                let take_yaml_string = |y: &Yaml| -> Option<String> {
                    match y {
                        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
                        Yaml::Integer(i) => Some(i.to_string()),
                        _ => None
                    }
                };
                let got: Vec<String> = array.iter().filter_map(take_yaml_string).collect();
                // reject arrays with elements that could not be read
                if got.is_empty() || got.len() != array.len() {
                    Err(())
                } else {
                    Ok(got)
                }
            },
            _ => Err(())
        }
    }
}

impl FromYaml for Vec<f64> {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        let strs: Vec<String> = FromYaml::from_yaml(arg, ctx)?;
        strs.iter()
            .map(|s| evaluate(s, ctx))
            .collect()
    }
}

impl FromYaml for ThreeVector {
    type Error = ();
    fn from_yaml(arg: Yaml, ctx: &HashMapContext) -> Result<Self, Self::Error> {
        let v: Vec<f64> = FromYaml::from_yaml(arg, ctx)?;
        if v.len() == 3 {
            Ok(ThreeVector::new(v[0], v[1], v[2]))
        } else {
            Err(())
        }
    }
}
