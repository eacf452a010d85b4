//! Attribute patching of body descriptions.
//!
//! A body description is an MJCF document. Each templated body declares a table of
//! [`PatchRule`]s: which [`DynamicsKey`] rewrites which attribute of which element,
//! and how the requested value is rendered into the attribute string. Elements are
//! addressed by [`NodeSelector`]s, i.e. paths below the document root whose steps
//! carry the ordinal of the element among same-tag siblings.
//!
//! [`build_description`] streams the template through [`quick_xml`]. Events that are
//! not patched are written back untouched, so indentation, comments and
//! `<include>` directives of the template survive.
use crate::{
    dynamics::{DynamicsKey, DynamicsOverrides},
    error::TemplateError,
};
use log::{debug, trace};
use quick_xml::{
    events::{BytesStart, Event},
    Reader, Writer,
};
use std::{borrow::Cow, collections::HashMap, fmt, ops::Range};

/// Path of an element below the document root.
///
/// `NodeSelector(&[("worldbody", 0), ("body", 1), ("geom", 0)])` selects the first
/// `geom` child of the second `body` child of the first `worldbody`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSelector(pub &'static [(&'static str, usize)]);

impl NodeSelector {
    fn matches(&self, path: &[(Vec<u8>, usize)]) -> bool {
        self.0.len() == path.len()
            && self
                .0
                .iter()
                .zip(path)
                .all(|((tag, ix), (name, ord))| tag.as_bytes() == name.as_slice() && ix == ord)
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self
            .0
            .iter()
            .map(|(tag, ix)| format!("{}[{}]", tag, ix))
            .collect();
        f.write_str(&steps.join("/"))
    }
}

/// One space-separated component of a rendered attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    /// Emitted as-is.
    Literal(&'static str),

    /// Emits `scale * (value + offset)`.
    Value {
        /// Multiplier, typically `1` or `-1`.
        scale: f64,
        /// Fixed offset added before scaling.
        offset: f64,
    },
}

impl Component {
    /// The requested value itself.
    pub const VALUE: Self = Self::Value {
        scale: 1.0,
        offset: 0.0,
    };

    /// The negated requested value.
    pub const NEG_VALUE: Self = Self::Value {
        scale: -1.0,
        offset: 0.0,
    };
}

/// How a requested value becomes an attribute string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrFormat {
    /// The value on its own.
    Scalar,

    /// Space-joined components, e.g. a `fromto` or `pos` vector.
    Components(&'static [Component]),
}

impl AttrFormat {
    /// Renders `value`.
    pub fn render(&self, value: f64) -> String {
        match self {
            Self::Scalar => format_number(value),
            Self::Components(components) => components
                .iter()
                .map(|c| match c {
                    Component::Literal(s) => (*s).to_string(),
                    Component::Value { scale, offset } => format_number(scale * (value + offset)),
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Rewrites `attribute` of the element at `selector` when `key` is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchRule {
    /// Key that triggers the rule.
    pub key: DynamicsKey,

    /// Element to patch.
    pub selector: NodeSelector,

    /// Attribute to set. Added to the element if it is absent.
    pub attribute: &'static str,

    /// Rendering of the value.
    pub format: AttrFormat,
}

/// Formats a number the way attribute values are written in model files: shortest
/// round-trip representation, with a trailing `.0` on integral values.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

struct Patch<'r> {
    rule: &'r PatchRule,
    value: String,
    applied: bool,
}

struct Frame {
    name: Vec<u8>,
    ordinal: usize,
    children: HashMap<Vec<u8>, usize>,
}

/// Applies the rules of `rules` triggered by `overrides` to `template`.
///
/// Returns the template unchanged, without copying, if `overrides` is `None` or holds
/// no key that any rule reacts to. Keys no rule reacts to are ignored.
///
/// # Errors
///
/// [`TemplateError::MissingTemplateNode`] if a triggered rule addresses an element
/// that is not in the template, [`TemplateError::NonFiniteValue`] for NaN or infinite
/// values, [`TemplateError::Xml`] if the template is malformed.
pub fn build_description<'a>(
    template: &'a str,
    rules: &[PatchRule],
    overrides: Option<&DynamicsOverrides>,
) -> Result<Cow<'a, str>, TemplateError> {
    let overrides = match overrides {
        None => return Ok(Cow::Borrowed(template)),
        Some(overrides) => overrides,
    };
    for key in overrides.unrecognized() {
        debug!("Ignoring unrecognized dynamics key '{}'", key);
    }

    let mut patches = Vec::new();
    for rule in rules {
        if let Some(value) = overrides.get(rule.key) {
            if !value.is_finite() {
                return Err(TemplateError::NonFiniteValue {
                    key: rule.key.as_str(),
                });
            }
            patches.push(Patch {
                rule,
                value: rule.format.render(value),
                applied: false,
            });
        }
    }
    if patches.is_empty() {
        debug!("No dynamics override applies, using the template as-is");
        return Ok(Cow::Borrowed(template));
    }

    let output = patch_stream(template, &mut patches)?;

    if let Some(missing) = patches.iter().find(|p| !p.applied) {
        return Err(TemplateError::MissingTemplateNode {
            selector: missing.rule.selector.to_string(),
        });
    }
    Ok(Cow::Owned(output))
}

fn xml_error(e: impl fmt::Display) -> TemplateError {
    TemplateError::Xml(e.to_string())
}

fn patch_stream(template: &str, patches: &mut [Patch]) -> Result<String, TemplateError> {
    let mut reader = Reader::from_str(template);
    let mut writer = Writer::new(Vec::with_capacity(template.len()));
    let mut stack: Vec<Frame> = Vec::new();
    let mut top_level: HashMap<Vec<u8>, usize> = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (frame, e) = visit(&mut stack, &mut top_level, e, patches)?;
                writer.write_event(Event::Start(e)).map_err(xml_error)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let (_, e) = visit(&mut stack, &mut top_level, e, patches)?;
                writer.write_event(Event::Empty(e)).map_err(xml_error)?;
            }
            Ok(Event::End(e)) => {
                stack.pop();
                writer.write_event(Event::End(e)).map_err(xml_error)?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event).map_err(xml_error)?,
            Err(e) => {
                return Err(TemplateError::Xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// Assigns the element its ordinal, patches it if a rule selects it, and returns the
/// frame to push if the element has children.
fn visit<'e>(
    stack: &mut [Frame],
    top_level: &mut HashMap<Vec<u8>, usize>,
    e: BytesStart<'e>,
    patches: &mut [Patch],
) -> Result<(Frame, BytesStart<'e>), TemplateError> {
    let name = e.name().as_ref().to_vec();
    let counts = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => top_level,
    };
    let count = counts.entry(name.clone()).or_insert(0);
    let ordinal = *count;
    *count += 1;

    // The root element itself is not part of selector paths.
    let mut path: Vec<(Vec<u8>, usize)> = stack
        .iter()
        .skip(1)
        .map(|f| (f.name.clone(), f.ordinal))
        .collect();
    let is_root = stack.is_empty();
    path.push((name.clone(), ordinal));

    let frame = Frame {
        name,
        ordinal,
        children: HashMap::new(),
    };
    if is_root {
        return Ok((frame, e));
    }

    let selected: Vec<usize> = patches
        .iter()
        .enumerate()
        .filter(|(_, p)| p.rule.selector.matches(&path))
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        return Ok((frame, e));
    }

    let patched = patch_element(&e, patches, &selected)?;
    Ok((frame, patched))
}

/// Spans of the attributes in the raw attribute text of an element: the attribute
/// name and the byte range of its value without the quotes.
fn attribute_spans(raw: &str) -> Result<Vec<(&str, Range<usize>)>, TemplateError> {
    let bytes = raw.as_bytes();
    let malformed = || TemplateError::Xml(format!("malformed attributes: {}", raw));
    let skip_ws = |mut i: usize| {
        while bytes.get(i).map_or(false, |b| b.is_ascii_whitespace()) {
            i += 1;
        }
        i
    };

    let mut spans = Vec::new();
    let mut i = skip_ws(0);
    while i < bytes.len() {
        let name_start = i;
        while bytes
            .get(i)
            .map_or(false, |&b| b != b'=' && !b.is_ascii_whitespace())
        {
            i += 1;
        }
        let name = &raw[name_start..i];
        i = skip_ws(i);
        if bytes.get(i) != Some(&b'=') {
            return Err(malformed());
        }
        i = skip_ws(i + 1);
        let quote = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return Err(malformed()),
        };
        let value_start = i + 1;
        let value_end = bytes[value_start..]
            .iter()
            .position(|&b| b == quote)
            .map(|n| value_start + n)
            .ok_or_else(malformed)?;
        spans.push((name, value_start..value_end));
        i = skip_ws(value_end + 1);
    }
    Ok(spans)
}

/// Rewrites the values of the selected attributes in place. Everything else in the
/// start tag, including layout and quoting, is copied verbatim.
fn patch_element<'e>(
    e: &BytesStart,
    patches: &mut [Patch],
    selected: &[usize],
) -> Result<BytesStart<'e>, TemplateError> {
    // Well-formedness and duplicate checks.
    for attr in e.attributes() {
        attr.map_err(xml_error)?;
    }
    let qname = e.name();
    let name = std::str::from_utf8(qname.as_ref()).map_err(xml_error)?;
    let raw = std::str::from_utf8(e.attributes_raw()).map_err(xml_error)?;

    let mut content = String::with_capacity(name.len() + raw.len() + 32);
    content.push_str(name);
    let mut last = 0;
    for (attr, range) in attribute_spans(raw)? {
        let replacement = selected
            .iter()
            .copied()
            .find(|&i| patches[i].rule.attribute == attr);
        if let Some(i) = replacement {
            let p = &mut patches[i];
            trace!(
                "{}: {} = {} -> {}",
                p.rule.selector,
                p.rule.attribute,
                &raw[range.clone()],
                p.value
            );
            content.push_str(&raw[last..range.start]);
            content.push_str(&p.value);
            last = range.end;
            p.applied = true;
        }
    }
    let rest = &raw[last..];
    let trimmed = rest.trim_end();
    content.push_str(trimmed);

    // Attributes the element did not carry yet.
    for &i in selected {
        let p = &mut patches[i];
        if !p.applied {
            trace!("{}: adding {} = {}", p.rule.selector, p.rule.attribute, p.value);
            content.push_str(&format!(" {}=\"{}\"", p.rule.attribute, p.value));
            p.applied = true;
        }
    }
    content.push_str(&rest[trimmed.len()..]);

    Ok(BytesStart::from_content(content, name.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<mujoco model="test">
  <!-- comment kept -->
  <worldbody>
    <geom name="floor" type="plane" size="1 1 .1"/>
    <body name="torso" pos="0 0 1">
      <geom name="torso" size="0.07 0.3"/>
      <geom name="head" pos=".6 0 .1"/>
      <body name="leg">
        <geom name="leg" fromto="0 0 0 0 0 -.5"/>
      </body>
    </body>
  </worldbody>
</mujoco>
"#;

    const TORSO: NodeSelector = NodeSelector(&[("worldbody", 0), ("body", 0), ("geom", 0)]);
    const HEAD: NodeSelector = NodeSelector(&[("worldbody", 0), ("body", 0), ("geom", 1)]);

    const RULES: &[PatchRule] = &[
        PatchRule {
            key: DynamicsKey::Length,
            selector: TORSO,
            attribute: "size",
            format: AttrFormat::Components(&[Component::Literal("0.07"), Component::VALUE]),
        },
        PatchRule {
            key: DynamicsKey::Length,
            selector: HEAD,
            attribute: "pos",
            format: AttrFormat::Components(&[
                Component::Value {
                    scale: 1.0,
                    offset: 0.1,
                },
                Component::Literal("0"),
                Component::Literal("0.1"),
            ]),
        },
        PatchRule {
            key: DynamicsKey::Mass,
            selector: TORSO,
            attribute: "mass",
            format: AttrFormat::Scalar,
        },
    ];

    #[test]
    fn test_none_is_passthrough() {
        let out = build_description(TEMPLATE, RULES, None).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_unrecognized_keys_are_passthrough() {
        let overrides = DynamicsOverrides::default().set("stiffness", 2.0).size(3.0);
        let out = build_description(TEMPLATE, RULES, Some(&overrides)).unwrap();
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_length_patches_only_selected_attributes() {
        let overrides = DynamicsOverrides::default().length(0.9);
        let out = build_description(TEMPLATE, RULES, Some(&overrides)).unwrap();
        let expected = TEMPLATE
            .replace(r#"size="0.07 0.3""#, r#"size="0.07 0.9""#)
            .replace(r#"pos=".6 0 .1""#, r#"pos="1.0 0 0.1""#);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_missing_attribute_is_added() {
        let overrides = DynamicsOverrides::default().mass(2.0);
        let out = build_description(TEMPLATE, RULES, Some(&overrides)).unwrap();
        assert!(out.contains(r#"<geom name="torso" size="0.07 0.3" mass="2.0"/>"#));
    }

    #[test]
    fn test_patched_element_keeps_layout_and_quoting() {
        let template = "<mujoco>\n  <worldbody>\n    <body name=\"torso\">\n      <geom name=\"torso\"\n            size='0.07 0.3'   rgba=\"1 0 0 1\" />\n    </body>\n  </worldbody>\n</mujoco>\n";
        let overrides = DynamicsOverrides::default().length(0.9).mass(2.0);
        let torso_rules = [RULES[0], RULES[2]];
        let out = build_description(template, &torso_rules, Some(&overrides)).unwrap();
        assert_eq!(
            out,
            template.replace(
                "size='0.07 0.3'   rgba=\"1 0 0 1\" />",
                "size='0.07 0.9'   rgba=\"1 0 0 1\" mass=\"2.0\" />"
            )
        );
    }

    #[test]
    fn test_single_quoted_value_with_double_quote() {
        const LABEL: &[PatchRule] = &[PatchRule {
            key: DynamicsKey::Size,
            selector: NodeSelector(&[("worldbody", 0), ("geom", 0)]),
            attribute: "size",
            format: AttrFormat::Scalar,
        }];
        let template = r#"<mujoco><worldbody><geom user='say "hi"' size=".1"/></worldbody></mujoco>"#;
        let overrides = DynamicsOverrides::default().size(0.25);
        let out = build_description(template, LABEL, Some(&overrides)).unwrap();
        assert_eq!(
            out,
            r#"<mujoco><worldbody><geom user='say "hi"' size="0.25"/></worldbody></mujoco>"#
        );
    }

    #[test]
    fn test_missing_node_fails() {
        const RULES: &[PatchRule] = &[PatchRule {
            key: DynamicsKey::Length,
            selector: NodeSelector(&[("worldbody", 0), ("body", 1)]),
            attribute: "pos",
            format: AttrFormat::Scalar,
        }];
        let overrides = DynamicsOverrides::default().length(1.0);
        assert_eq!(
            build_description(TEMPLATE, RULES, Some(&overrides)),
            Err(TemplateError::MissingTemplateNode {
                selector: "worldbody[0]/body[1]".to_string()
            })
        );
    }

    #[test]
    fn test_non_finite_value_fails() {
        let overrides = DynamicsOverrides::default().length(f64::NAN);
        assert_eq!(
            build_description(TEMPLATE, RULES, Some(&overrides)),
            Err(TemplateError::NonFiniteValue { key: "length" })
        );
    }

    #[test]
    fn test_malformed_template_fails() {
        let overrides = DynamicsOverrides::default().length(1.0);
        let result = build_description("<mujoco><worldbody></mujoco>", RULES, Some(&overrides));
        assert!(matches!(result, Err(TemplateError::Xml(_))));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.9), "0.9");
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(0.9 - 0.07), "0.8300000000000001");
        assert_eq!(
            AttrFormat::Components(&[Component::NEG_VALUE, Component::Literal("0")]).render(0.5),
            "-0.5 0"
        );
    }
}
