//! Connection records declared in the `Connections` block.
//!
//! ```text
//! Connections:  {
//!     C: "OO",2000,1000
//!     C: "OP",3000,2000, "DiffuseColor"
//! }
//! ```

use derive_more::{Display, From};

use crate::scope::Element;
use crate::value::PropertyValue;

/// Document local object identifier
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{_0}")]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Parent id standing for the scene root
    pub const ROOT: DocumentId = DocumentId(0);
}

/// The kind of edge a connection declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// `OO`: an object is owned by another object
    ObjectObject,
    /// `OP`: an object drives the named property of another object
    ObjectProperty(String),
    /// Any other relation
    Other(String),
}

impl Relation {
    pub fn code(&self) -> &str {
        match self {
            Relation::ObjectObject => "OO",
            Relation::ObjectProperty(_) => "OP",
            Relation::Other(code) => code,
        }
    }
}

/// One `C` element: `child` is connected to `parent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub relation: Relation,
    pub child: DocumentId,
    pub parent: DocumentId,
}

impl Connection {
    /// Read a `C` element, `None` when it does not carry a relation and two integer ids
    pub fn from_element(element: &Element) -> Option<Self> {
        let code = element.property(0)?.as_str()?;
        let child = DocumentId(element.property(1)?.as_i64()?);
        let parent = DocumentId(element.property(2)?.as_i64()?);

        let relation = match code {
            "OO" => Relation::ObjectObject,
            "OP" => Relation::ObjectProperty(
                element
                    .property(3)
                    .and_then(PropertyValue::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            ),
            other => Relation::Other(other.to_owned()),
        };
        Some(Self {
            relation,
            child,
            parent,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Connection, DocumentId, Relation};
    use crate::scope::Element;
    use crate::token::Position;
    use crate::value::PropertyValue;

    fn element(properties: Vec<PropertyValue>) -> Element {
        let mut element = Element::new("C", Position::Offset(0));
        element.properties = properties;
        element
    }

    #[test]
    fn reads_relations() {
        let oo = element(vec![
            PropertyValue::String("OO".into()),
            PropertyValue::Int64(10),
            PropertyValue::Int64(0),
        ]);
        assert_eq!(
            Connection::from_element(&oo),
            Some(Connection {
                relation: Relation::ObjectObject,
                child: DocumentId(10),
                parent: DocumentId::ROOT,
            })
        );

        let op = element(vec![
            PropertyValue::String("OP".into()),
            PropertyValue::Int64(3),
            PropertyValue::Int32(2),
            PropertyValue::String("DiffuseColor".into()),
        ]);
        let connection = Connection::from_element(&op).unwrap();
        assert_eq!(
            connection.relation,
            Relation::ObjectProperty("DiffuseColor".into())
        );
        assert_eq!(connection.relation.code(), "OP");
        assert_eq!(connection.parent, DocumentId(2));
    }

    #[test]
    fn rejects_malformed_records() {
        // Legacy documents connect by name
        let named = element(vec![
            PropertyValue::String("OO".into()),
            PropertyValue::String("Model::Cube".into()),
            PropertyValue::String("Model::Scene".into()),
        ]);
        assert_eq!(Connection::from_element(&named), None);
        assert_eq!(Connection::from_element(&element(vec![])), None);
    }
}
