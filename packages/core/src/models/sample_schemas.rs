//! Bundled Sample Schemas
//!
//! Ready-made data schemas that can be loaded into the designer through the
//! import engine. The catalog is built once per process, like the field type
//! registry.

use crate::services::FormTreeError;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// A named sample schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSchema {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uischema: Option<Value>,
}

static SAMPLES: OnceLock<Vec<SampleSchema>> = OnceLock::new();

/// All bundled samples
pub fn sample_schemas() -> &'static [SampleSchema] {
    SAMPLES.get_or_init(|| vec![product_order(), organization_onboarding()])
}

/// Look up a sample by id
///
/// # Errors
///
/// `FormTreeError::NotFound` for an unknown id.
pub fn find_sample(id: &str) -> Result<&'static SampleSchema, FormTreeError> {
    sample_schemas()
        .iter()
        .find(|sample| sample.id == id)
        .ok_or_else(|| FormTreeError::not_found(format!("sample schema '{}'", id)))
}

fn product_order() -> SampleSchema {
    SampleSchema {
        id: "product-order",
        name: "Product Order Form",
        description: "E-commerce order form with product selection and shipping details",
        tags: &["E-commerce", "Order", "Shopping"],
        schema: json!({
            "type": "object",
            "properties": {
                "customerName": { "type": "string", "title": "Full Name" },
                "email": { "type": "string", "format": "email", "title": "Email" },
                "phone": { "type": "string", "title": "Phone Number" },
                "product": {
                    "type": "string",
                    "title": "Product",
                    "enum": ["Laptop", "Smartphone", "Tablet", "Headphones", "Smart Watch"]
                },
                "quantity": {
                    "type": "number",
                    "title": "Quantity",
                    "minimum": 1,
                    "maximum": 10
                },
                "shippingAddress": {
                    "type": "string",
                    "title": "Shipping Address",
                    "maxLength": 500
                },
                "shippingMethod": {
                    "type": "string",
                    "title": "Shipping Method",
                    "enum": ["Standard (5-7 days)", "Express (2-3 days)", "Overnight"]
                },
                "giftWrap": { "type": "boolean", "title": "Gift Wrap ($5 extra)" },
                "specialInstructions": {
                    "type": "string",
                    "title": "Special Instructions",
                    "maxLength": 200
                }
            },
            "required": ["customerName", "email", "product", "quantity", "shippingAddress"]
        }),
        uischema: None,
    }
}

fn organization_onboarding() -> SampleSchema {
    let address = json!({
        "type": "object",
        "properties": {
            "address_line_1": { "type": "string" },
            "address_line_2": { "type": "string" },
            "city": { "type": "string" },
            "state": { "type": "string" },
            "country": { "type": "string" },
            "zipcode": { "type": "string" }
        },
        "required": ["address_line_1", "city", "country", "zipcode"]
    });

    SampleSchema {
        id: "organization-onboarding",
        name: "Organization Onboarding Form",
        description: "Comprehensive onboarding form for new organizations with multiple departments and contacts",
        tags: &["Onboarding", "Organization", "Multi-department"],
        schema: json!({
            "type": "object",
            "properties": {
                "personal_info": {
                    "type": "object",
                    "properties": {
                        "first_name": { "type": "string", "title": "First Name" },
                        "middle_name": { "type": "string", "title": "Middle Name" },
                        "last_name": { "type": "string", "title": "Last Name" },
                        "blood_group": {
                            "type": "string",
                            "title": "Blood Group",
                            "enum": ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "Prefer not to say"]
                        },
                        "date_of_birth": { "type": "string", "format": "date", "title": "Date of Birth" },
                        "gender": {
                            "type": "string",
                            "enum": ["Male", "Female", "Other", "Prefer not to say"]
                        },
                        "nationality": { "type": "string" }
                    },
                    "required": ["first_name", "last_name", "date_of_birth", "gender", "nationality"]
                },
                "contact_info": {
                    "type": "object",
                    "properties": {
                        "contact_number": { "type": "string", "title": "Contact Number" },
                        "email": { "type": "string", "format": "email", "title": "Email" },
                        "current_address": address.clone(),
                        "permanent_address": address
                    },
                    "required": ["contact_number", "email"]
                },
                "education": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "degree": {
                                "type": "string",
                                "enum": ["High School", "Associate", "Bachelor", "Master", "Doctorate"]
                            },
                            "field_of_study": { "type": "string" },
                            "institution_name": { "type": "string" },
                            "start_year": { "type": "number" },
                            "end_year": { "type": "number" }
                        },
                        "required": ["degree", "field_of_study", "institution_name", "start_year"]
                    },
                    "minItems": 1,
                    "uniqueItems": true
                },
                "emergency_contacts": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "first_name": { "type": "string" },
                            "last_name": { "type": "string" },
                            "contact_number": { "type": "string" },
                            "relation": { "type": "string" }
                        },
                        "required": ["first_name", "last_name", "contact_number", "relation"]
                    },
                    "minItems": 1,
                    "uniqueItems": true
                },
                "documents": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "description": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["UPLOAD-PENDING", "REVIEW-PENDING", "ACCEPTED", "REJECTED"]
                            },
                            "comments": { "type": "string", "maxLength": 1000 }
                        },
                        "required": ["id", "description", "status"]
                    }
                },
                "employment_info": {
                    "type": "object",
                    "properties": {
                        "employeeid": { "type": "string", "title": "Employee Id" },
                        "joining_date": { "type": "string", "format": "date" },
                        "employee_level": {
                            "type": "string",
                            "enum": ["Junior", "Mid", "Senior", "Lead", "Manager", "Director", "VP", "C-Level"]
                        },
                        "job_role": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "title": { "type": "string", "title": "Job Role" }
                            },
                            "required": ["code", "title"]
                        },
                        "salary": {
                            "type": "object",
                            "title": "Salary Details",
                            "properties": {
                                "currency": { "type": "string", "title": "Currency" },
                                "basic_salary": { "type": "number", "title": "Basic Salary" },
                                "allowances": { "type": "number", "title": "Allowances" },
                                "net_salary": { "type": "number", "title": "Net Salary" }
                            },
                            "required": ["currency", "basic_salary", "net_salary"]
                        },
                        "accounts": {
                            "type": "array",
                            "title": "Accounts",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string", "title": "Account ID" },
                                    "name": { "type": "string", "title": "Account Name" },
                                    "start_date": { "type": "string", "format": "date", "title": "Start Date" },
                                    "projects": {
                                        "type": "array",
                                        "title": "Projects",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "id": { "type": "string", "title": "Project ID" },
                                                "name": { "type": "string", "title": "Project Name" },
                                                "start_date": { "type": "string", "format": "date", "title": "Start Date" }
                                            },
                                            "required": ["id", "name"]
                                        }
                                    }
                                },
                                "required": ["id", "name", "start_date"]
                            }
                        }
                    },
                    "required": ["employeeid", "joining_date", "job_role", "salary"]
                },
                "skills": {
                    "type": "array",
                    "title": "Skills",
                    "items": {
                        "type": "object",
                        "properties": {
                            "skill": { "type": "string", "title": "Skills" },
                            "self": { "type": "integer", "title": "Self Rating" },
                            "system": { "type": "integer", "title": "System Rating" }
                        },
                        "required": ["skill"]
                    }
                }
            },
            "required": [
                "personal_info",
                "contact_info",
                "education",
                "emergency_contacts",
                "documents",
                "employment_info",
                "skills"
            ]
        }),
        uischema: None,
    }
}
