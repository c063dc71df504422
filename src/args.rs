use super::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ArgsBuilder {
    positions: Vec<(usize, String)>,
    flags: Vec<String>,
    single_args: Vec<String>,
    multi_args: Vec<String>,
}

impl ArgsBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(mut self, pos: usize, name: &str) -> Self {
        self.positions.push((pos, name.into()));
        self
    }

    pub(crate) fn flag(mut self, name: &str) -> Self {
        self.flags.push(name.into());
        self
    }

    pub(crate) fn arg(mut self, name: &str) -> Self {
        self.single_args.push(name.into());
        self
    }

    /// An option that may be given several times, e.g. `-p a -p b`.
    pub(crate) fn multi(mut self, name: &str) -> Self {
        self.multi_args.push(name.into());
        self
    }

    pub(crate) fn build(self, args: &[String]) -> Result<Args> {
        let mut map: HashMap<String, ArgValue> = HashMap::new();
        let mut args = args.to_vec();
        let Self {
            mut positions,
            flags,
            single_args,
            multi_args,
        } = self;

        for flag in flags {
            if let Some(pos) = args.iter().position(|v| v.as_str() == flag.as_str()) {
                args.remove(pos);
                map.insert(flag, ArgValue::Bool(true));
            }
        }

        for single_arg in single_args {
            if let Some(pos) = args.iter().position(|v| v.as_str() == single_arg.as_str()) {
                let value = take_value(&mut args, pos, &single_arg)?;
                map.insert(single_arg, ArgValue::String(value));
            }
        }

        for multi_arg in multi_args {
            let mut values = vec![];
            while let Some(pos) = args.iter().position(|v| v.as_str() == multi_arg.as_str()) {
                values.push(take_value(&mut args, pos, &multi_arg)?);
            }
            map.insert(multi_arg, ArgValue::List(values));
        }

        positions.sort_by(|a, b| a.0.cmp(&b.0));
        for (pos, name) in positions {
            if let Some(value) = args.get(pos) {
                map.insert(name, ArgValue::String(value.into()));
            }
        }

        Ok(Args(map))
    }
}

fn take_value(args: &mut Vec<String>, pos: usize, name: &str) -> Result<String> {
    args.remove(pos);
    if pos < args.len() {
        Ok(args.remove(pos))
    } else {
        Err(Error::InvalidArgs(format!("{name} needs a value")))
    }
}

#[derive(Debug)]
enum ArgValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

#[derive(Debug)]
pub(crate) struct Args(HashMap<String, ArgValue>);

impl Args {
    pub(crate) fn builder() -> ArgsBuilder {
        ArgsBuilder::new()
    }

    pub(crate) fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(ArgValue::Bool(v)) => *v,
            _ => false,
        }
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(ArgValue::String(v)) => Some(v.into()),
            _ => None,
        }
    }

    pub(crate) fn required(&self, key: &str) -> Result<String> {
        self.value(key)
            .ok_or_else(|| Error::InvalidArgs(format!("argument {key:?} is required")))
    }

    pub(crate) fn values(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(ArgValue::List(v)) => v.clone(),
            _ => vec![],
        }
    }
}
