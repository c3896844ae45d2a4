use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use super::Value;

/// A shared record of named fields, optionally inheriting from a prototype.
///
/// Cloning an `Object` clones the handle, not the fields: every clone observes the same
/// mutations, which is what lets one task set a field while another waits for it.
#[derive(Clone, Default)]
pub struct Object {
    inner: Rc<RefCell<ObjectInner>>,
}

#[derive(Default)]
struct ObjectInner {
    fields: BTreeMap<String, Value>,
    prototype: Option<Object>,
}

impl Object {
    /// Creates an empty object with no prototype.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object that inherits the fields of `prototype`.
    #[must_use]
    pub fn with_prototype(prototype: Object) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                fields: BTreeMap::new(),
                prototype: Some(prototype),
            })),
        }
    }

    /// Looks up `field` on this object, then along its prototype chain.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        match inner.fields.get(field) {
            Some(value) => Some(value.clone()),
            None => inner.prototype.as_ref().and_then(|proto| proto.get(field)),
        }
    }

    /// Sets an own field, returning the previous own value.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .borrow_mut()
            .fields
            .insert(field.into(), value.into())
    }

    /// Removes an own field, returning its value.
    pub fn remove(&self, field: &str) -> Option<Value> {
        self.inner.borrow_mut().fields.remove(field)
    }

    /// Whether `field` is present on this object or anywhere on its prototype chain.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        let inner = self.inner.borrow();
        inner.fields.contains_key(field)
            || inner.prototype.as_ref().is_some_and(|proto| proto.has(field))
    }

    /// Whether `field` is an own field of this object.
    #[must_use]
    pub fn has_own(&self, field: &str) -> bool {
        self.inner.borrow().fields.contains_key(field)
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.borrow().fields.iter())
            .finish()
    }
}

/// A shared, growable sequence of values.
#[derive(Clone, Default)]
pub struct Array {
    items: Rc<RefCell<Vec<Value>>>,
}

impl Array {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value.
    pub fn push(&self, value: impl Into<Value>) {
        self.items.borrow_mut().push(value.into());
    }

    /// Whether any element is strictly equal to `value`, counting `NaN` as equal to itself.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.borrow().iter().any(|item| match (item, value) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => item.strict_eq(value),
        })
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Copies the current elements out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Returns `true` if both handles refer to the same array.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: Rc::new(RefCell::new(iter.into_iter().map(Into::into).collect())),
        }
    }
}
