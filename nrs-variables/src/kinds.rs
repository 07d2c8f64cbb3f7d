//!
//! The concrete variable kinds.
//!
//! The four value-holding kinds share one implementation,
//! [`ScalarVariable`], parameterised over how the `value` field of a
//! message is parsed.  `Void` variables carry no value (receiving a
//! message is the event) and `FileWriter` variables append the `data` of
//! every message they receive to a file.
//!

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use nrs_core::{constants::field, DeliverError, Message, Value, Variable, VariableKind, Vnid};
use tracing::trace;

/// A value a [`ScalarVariable`] can hold.
pub trait Scalar: Clone + Default + Send + 'static {
    /// The kind of variable holding this value
    const KIND: VariableKind;

    /// Parse the wire form of the value
    fn parse(raw: &str) -> Option<Self>;

    /// Convert into the kind-independent [`Value`]
    fn to_value(&self) -> Value;
}

impl Scalar for bool {
    const KIND: VariableKind = VariableKind::Boolean;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl Scalar for f64 {
    const KIND: VariableKind = VariableKind::Float;

    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Scalar for i64 {
    const KIND: VariableKind = VariableKind::Integer;

    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl Scalar for String {
    const KIND: VariableKind = VariableKind::String;

    fn parse(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

/// A variable holding a single value taken from the `value` field of the
/// messages it receives.
#[derive(Clone, Debug)]
pub struct ScalarVariable<T: Scalar> {
    /// The VNID of the variable
    vnid: Vnid,
    /// The name of the variable
    vn_name: String,
    /// The last value received
    value: T,
}

/// A `Boolean` variable
pub type BooleanVariable = ScalarVariable<bool>;
/// A `Float` variable
pub type FloatVariable = ScalarVariable<f64>;
/// An `Integer` variable
pub type IntegerVariable = ScalarVariable<i64>;
/// A `String` variable
pub type StringVariable = ScalarVariable<String>;

impl<T: Scalar> ScalarVariable<T> {
    /// Create a variable holding the default value
    pub fn new(vnid: Vnid, vn_name: impl Into<String>) -> Self {
        Self {
            vnid,
            vn_name: vn_name.into(),
            value: T::default(),
        }
    }

    /// The last value received
    pub fn get(&self) -> &T {
        &self.value
    }
}

impl<T: Scalar> Variable for ScalarVariable<T> {
    fn vnid(&self) -> Vnid {
        self.vnid
    }

    fn vn_name(&self) -> &str {
        &self.vn_name
    }

    fn kind(&self) -> VariableKind {
        T::KIND
    }

    fn value(&self) -> Value {
        self.value.to_value()
    }

    fn deliver(&mut self, message: &Message) -> Result<(), DeliverError> {
        let raw = message.check_field(field::VALUE)?;
        self.value = T::parse(raw).ok_or_else(|| DeliverError::invalid_field(field::VALUE, raw))?;
        trace!(vnid = self.vnid, value = raw, "variable updated");
        Ok(())
    }
}

/// A variable without a value.
#[derive(Clone, Debug)]
pub struct VoidVariable {
    /// The VNID of the variable
    vnid: Vnid,
    /// The name of the variable
    vn_name: String,
    /// How many messages the variable has received
    events: u64,
}

impl VoidVariable {
    /// Create a variable that has seen no events
    pub fn new(vnid: Vnid, vn_name: impl Into<String>) -> Self {
        Self {
            vnid,
            vn_name: vn_name.into(),
            events: 0,
        }
    }

    /// How many messages the variable has received
    pub fn events(&self) -> u64 {
        self.events
    }
}

impl Variable for VoidVariable {
    fn vnid(&self) -> Vnid {
        self.vnid
    }

    fn vn_name(&self) -> &str {
        &self.vn_name
    }

    fn kind(&self) -> VariableKind {
        VariableKind::Void
    }

    fn value(&self) -> Value {
        Value::Void
    }

    fn deliver(&mut self, _message: &Message) -> Result<(), DeliverError> {
        self.events += 1;
        Ok(())
    }
}

/// A variable that appends the `data` of each message to the file named by
/// its `dirName` and `fileName` fields.
#[derive(Clone, Debug)]
pub struct FileWriterVariable {
    /// The VNID of the variable
    vnid: Vnid,
    /// The name of the variable
    vn_name: String,
    /// The file written last
    last_path: Option<PathBuf>,
}

impl FileWriterVariable {
    /// Create a variable that has written nothing yet
    pub fn new(vnid: Vnid, vn_name: impl Into<String>) -> Self {
        Self {
            vnid,
            vn_name: vn_name.into(),
            last_path: None,
        }
    }
}

impl Variable for FileWriterVariable {
    fn vnid(&self) -> Vnid {
        self.vnid
    }

    fn vn_name(&self) -> &str {
        &self.vn_name
    }

    fn kind(&self) -> VariableKind {
        VariableKind::FileWriter
    }

    fn value(&self) -> Value {
        let path = self.last_path.as_ref().map(|path| path.display().to_string());
        Value::String(path.unwrap_or_default())
    }

    fn deliver(&mut self, message: &Message) -> Result<(), DeliverError> {
        let dir_name = message.check_field(field::DIR_NAME)?;
        let file_name = message.check_field(field::FILE_NAME)?;
        let data = message.check_field(field::DATA)?;
        if dir_name.is_empty() {
            return Err(DeliverError::configuration("FileWriter needs a non-empty dirName"));
        }
        if file_name.is_empty() {
            return Err(DeliverError::configuration("FileWriter needs a non-empty fileName"));
        }

        fs::create_dir_all(dir_name)?;
        let path = PathBuf::from(dir_name).join(file_name);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(data.as_bytes())?;

        self.last_path = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_variables_parse_value() {
        let mut float = FloatVariable::new(1, "gain");
        float
            .deliver(&Message::new("Float").with_field("value", "0.25"))
            .unwrap();
        assert_eq!(float.value(), Value::Float(0.25));

        let mut boolean = BooleanVariable::new(2, "enabled");
        boolean
            .deliver(&Message::new("Boolean").with_field("value", "true"))
            .unwrap();
        assert_eq!(boolean.value(), Value::Boolean(true));

        let mut integer = IntegerVariable::new(3, "count");
        let value = rand::random::<i64>();
        integer
            .deliver(&Message::new("Integer").with_field("value", value.to_string()))
            .unwrap();
        assert_eq!(*integer.get(), value);
    }

    #[test]
    fn test_scalar_variable_errors() {
        let mut integer = IntegerVariable::new(3, "count");
        assert!(matches!(
            integer.deliver(&Message::new("Integer")),
            Err(DeliverError::MissingField(_))
        ));
        assert!(matches!(
            integer.deliver(&Message::new("Integer").with_field("value", "many")),
            Err(DeliverError::InvalidField { .. })
        ));
        assert_eq!(*integer.get(), 0);
    }

    #[test]
    fn test_is_diff_compares_type_names() {
        let float = FloatVariable::new(1, "gain");
        assert!(!float.is_diff(&Message::new("Float")));
        assert!(float.is_diff(&Message::new("float")));
        assert!(float.is_diff(&Message::new("Integer")));
    }

    #[test]
    fn test_void_variable_counts_events() {
        let mut void = VoidVariable::new(4, "tick");
        for _ in 0..3 {
            void.deliver(&Message::new("Void")).unwrap();
        }
        assert_eq!(void.events(), 3);
        assert_eq!(void.value(), Value::Void);
    }

    #[test]
    fn test_file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let dir_name = dir.path().join("out");
        let mut writer = FileWriterVariable::new(5, "log");

        for line in ["first\n", "second\n"] {
            let message = Message::new("FileWriter")
                .with_field("dirName", dir_name.display().to_string())
                .with_field("fileName", "trace.txt")
                .with_field("data", line);
            writer.deliver(&message).unwrap();
        }

        let written = fs::read_to_string(dir_name.join("trace.txt")).unwrap();
        assert_eq!(written, "first\nsecond\n");
        assert_eq!(
            writer.value(),
            Value::String(dir_name.join("trace.txt").display().to_string())
        );
    }

    #[test]
    fn test_file_writer_empty_dir_name_is_a_configuration_error() {
        let mut writer = FileWriterVariable::new(5, "log");
        let message = Message::new("FileWriter")
            .with_field("dirName", "")
            .with_field("fileName", "trace.txt")
            .with_field("data", "x");

        assert!(matches!(
            writer.deliver(&message),
            Err(DeliverError::Configuration { .. })
        ));
    }
}
