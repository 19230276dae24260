// crates/taskdef-core/src/validation/container_definitions.rs
// ============================================================================
// Module: Container Definitions Validation
// Description: Parse and schema checks for the container definitions document.
// Purpose: Reject malformed container JSON before any registry call.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! The container definitions attribute is a JSON document: an array of
//! objects, one per container. Validation runs in three passes:
//! 1. Parse: the text must be JSON and the top level an array of objects.
//!    Null-valued members are dropped here, so `"key": null` reads as unset.
//! 2. Schema: each element is checked against a Draft 2020-12 schema. The
//!    schema types every field this crate models; `command` in particular
//!    must be an array of strings.
//! 3. Semantic: elements decode into [`ContainerDefinition`] and container
//!    names must be unique.
//!
//! A failing pass stops the later ones, so a parse error never produces a
//! cascade of schema noise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::OnceLock;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;

use crate::core::ContainerDefinition;
use crate::core::identifiers::is_valid_resource_name;
use crate::validation::FieldError;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns the JSON schema applied to each container definition.
#[must_use]
pub fn container_definitions_schema() -> Value {
    let string_array = json!({ "type": "array", "items": { "type": "string" } });
    let non_negative = json!({ "type": "integer", "minimum": 0 });
    let port = json!({ "type": "integer", "minimum": 0, "maximum": 65535 });
    let port_mapping = json!({
        "type": "object",
        "required": ["containerPort"],
        "properties": {
            "containerPort": port,
            "hostPort": port,
            "protocol": { "enum": ["tcp", "udp"] }
        }
    });
    let environment_entry = json!({
        "type": "object",
        "required": ["name", "value"],
        "properties": {
            "name": { "type": "string" },
            "value": { "type": "string" }
        }
    });
    let mount_point = json!({
        "type": "object",
        "required": ["sourceVolume", "containerPath"],
        "properties": {
            "sourceVolume": { "type": "string" },
            "containerPath": { "type": "string" },
            "readOnly": { "type": "boolean" }
        }
    });
    let volume_from = json!({
        "type": "object",
        "required": ["sourceContainer"],
        "properties": {
            "sourceContainer": { "type": "string" },
            "readOnly": { "type": "boolean" }
        }
    });
    let ulimit = json!({
        "type": "object",
        "required": ["name", "softLimit", "hardLimit"],
        "properties": {
            "name": { "type": "string" },
            "softLimit": { "type": "integer" },
            "hardLimit": { "type": "integer" }
        }
    });
    let device_permissions = json!({
        "type": "array",
        "items": { "enum": ["read", "write", "mknod"] }
    });
    let device = json!({
        "type": "object",
        "required": ["hostPath"],
        "properties": {
            "hostPath": { "type": "string" },
            "containerPath": { "type": "string" },
            "permissions": device_permissions
        }
    });
    let extra_host = json!({
        "type": "object",
        "required": ["hostname", "ipAddress"],
        "properties": {
            "hostname": { "type": "string" },
            "ipAddress": { "type": "string" }
        }
    });
    let capabilities = json!({
        "type": "object",
        "properties": {
            "add": string_array,
            "drop": string_array
        }
    });
    let linux_parameters = json!({
        "type": "object",
        "properties": { "capabilities": capabilities }
    });
    let docker_labels = json!({
        "type": "object",
        "additionalProperties": { "type": "string" }
    });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ContainerDefinition",
        "type": "object",
        "required": ["name", "image"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "image": { "type": "string", "minLength": 1 },
            "cpu": non_negative,
            "memory": non_negative,
            "memoryReservation": non_negative,
            "essential": { "type": "boolean" },
            "command": string_array,
            "entryPoint": string_array,
            "links": string_array,
            "dockerSecurityOptions": string_array,
            "dnsServers": string_array,
            "dnsSearchDomains": string_array,
            "hostname": { "type": "string" },
            "workingDirectory": { "type": "string" },
            "user": { "type": "string" },
            "dockerLabels": docker_labels,
            "portMappings": { "type": "array", "items": port_mapping },
            "environment": { "type": "array", "items": environment_entry },
            "mountPoints": { "type": "array", "items": mount_point },
            "volumesFrom": { "type": "array", "items": volume_from },
            "ulimits": { "type": "array", "items": ulimit },
            "devices": { "type": "array", "items": device },
            "extraHosts": { "type": "array", "items": extra_host },
            "linuxParameters": linux_parameters
        }
    })
}

/// Compiled schema, built on first use.
static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Returns the compiled container definition schema.
fn schema_validator() -> Result<&'static Validator, String> {
    VALIDATOR
        .get_or_init(|| {
            jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&container_definitions_schema())
                .map_err(|err| err.to_string())
        })
        .as_ref()
        .map_err(Clone::clone)
}

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Validates a container definitions JSON document.
///
/// Returns an empty list when `text` is a valid document; otherwise every
/// problem found by the first failing pass, each attributed to `field`.
#[must_use]
pub fn validate_container_definitions(text: &str, field: &str) -> Vec<FieldError> {
    match parse_container_definitions(text, field) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    }
}

/// Validates and decodes a container definitions JSON document.
///
/// # Errors
///
/// Returns every [`FieldError`] of the first failing pass.
pub fn parse_container_definitions(
    text: &str,
    field: &str,
) -> Result<Vec<ContainerDefinition>, Vec<FieldError>> {
    let elements = parse_elements(text, field)?;
    check_schema(&elements, field)?;

    let mut errors = Vec::new();
    let mut definitions = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<ContainerDefinition>(element) {
            Ok(definition) => definitions.push(definition),
            Err(err) => errors.push(FieldError::schema(
                field,
                format!("container definition {index}: {err}"),
            )),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    check_names(&definitions, field)?;
    Ok(definitions)
}

// ============================================================================
// SECTION: Passes
// ============================================================================

/// Parses the document into its array elements.
fn parse_elements(text: &str, field: &str) -> Result<Vec<Value>, Vec<FieldError>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| vec![FieldError::parse(field, format!("invalid JSON: {err}"))])?;
    let mut elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(vec![FieldError::parse(
                field,
                format!("expected a JSON array of container definitions, got {}", json_kind(&other)),
            )]);
        }
    };
    let errors: Vec<FieldError> = elements
        .iter()
        .enumerate()
        .filter(|(_, element)| !element.is_object())
        .map(|(index, element)| {
            FieldError::parse(
                field,
                format!("container definition {index}: expected an object, got {}", json_kind(element)),
            )
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }
    for element in &mut elements {
        drop_null_members(element);
    }
    Ok(elements)
}

/// Removes null-valued object members at any depth.
///
/// An explicit `null` means "unset", the same as an omitted key. Null array
/// items are kept so the schema still rejects them.
fn drop_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            for member in map.values_mut() {
                drop_null_members(member);
            }
        }
        Value::Array(items) => {
            for item in items {
                drop_null_members(item);
            }
        }
        _ => {}
    }
}

/// Checks each element against the container definition schema.
fn check_schema(elements: &[Value], field: &str) -> Result<(), Vec<FieldError>> {
    let validator = schema_validator().map_err(|err| {
        vec![FieldError::schema(field, format!("container definition schema unavailable: {err}"))]
    })?;
    let mut errors = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        errors.extend(validator.iter_errors(element).map(|err| {
            FieldError::schema(field, format!("container definition {index}: {err}"))
        }));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Checks container name presence, format, and uniqueness.
fn check_names(definitions: &[ContainerDefinition], field: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if definitions.is_empty() {
        errors.push(FieldError::invalid(field, "at least one container definition is required"));
    }
    let mut seen = BTreeSet::new();
    for definition in definitions {
        let name = definition.name.as_str();
        if !is_valid_resource_name(name) {
            errors.push(FieldError::invalid(
                field,
                format!(
                    "container name {name:?} must be 1-255 letters, digits, hyphens, or underscores"
                ),
            ));
        }
        if !seen.insert(name) {
            errors.push(FieldError::invalid(field, format!("duplicate container name {name:?}")));
        }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Names the JSON type of a value for error messages.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
