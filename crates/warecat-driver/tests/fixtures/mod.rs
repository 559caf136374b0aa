//! Test fixtures for driver integration tests
//!
//! Reusable frames representing common warehouse tables, used to seed the
//! mock platform client.

use warecat_core::{Column, LogicalType, Nullability, ResultFrame, Schema, Value};

/// A typical users table with a few rows
pub fn users_frame() -> ResultFrame {
    ResultFrame::new(
        Schema::from_columns(vec![
            Column::new("id", LogicalType::Int).with_nullability(Nullability::No),
            Column::new("email", LogicalType::String).with_nullability(Nullability::No),
            Column::new("name", LogicalType::String).with_nullability(Nullability::Yes),
            Column::new("is_active", LogicalType::Bool).with_nullability(Nullability::No),
        ]),
        vec![
            vec![
                Value::Int(1),
                Value::Text("alice@example.com".to_string()),
                Value::Text("Alice".to_string()),
                Value::Bool(true),
            ],
            vec![
                Value::Int(2),
                Value::Text("bob@example.com".to_string()),
                Value::Null,
                Value::Bool(false),
            ],
        ],
    )
}

/// A typical orders table with decimal amounts carried as text
pub fn orders_frame() -> ResultFrame {
    ResultFrame::new(
        Schema::from_columns(vec![
            Column::new("id", LogicalType::Int).with_nullability(Nullability::No),
            Column::new("user_id", LogicalType::Int).with_nullability(Nullability::No),
            Column::new(
                "total_amount",
                LogicalType::Decimal {
                    precision: Some(10),
                    scale: Some(2),
                },
            )
            .with_nullability(Nullability::No),
            Column::new("status", LogicalType::String).with_nullability(Nullability::No),
        ]),
        vec![
            vec![
                Value::Int(100),
                Value::Int(1),
                Value::Text("19.99".to_string()),
                Value::Text("shipped".to_string()),
            ],
            vec![
                Value::Int(101),
                Value::Int(2),
                Value::Text("5.00".to_string()),
                Value::Text("pending".to_string()),
            ],
            vec![
                Value::Int(102),
                Value::Int(1),
                Value::Text("120.50".to_string()),
                Value::Text("returned".to_string()),
            ],
        ],
    )
}

/// An event-properties table exercising JSON cells
pub fn events_frame() -> ResultFrame {
    ResultFrame::new(
        Schema::from_columns(vec![
            Column::new("event_id", LogicalType::String).with_nullability(Nullability::No),
            Column::new("properties", LogicalType::Json).with_nullability(Nullability::Yes),
        ]),
        vec![
            vec![
                Value::Text("evt-1".to_string()),
                Value::Json(serde_json::json!({"page": "/home"})),
            ],
            vec![Value::Text("evt-2".to_string()), Value::Null],
        ],
    )
}

/// An empty frame over a minimal schema
pub fn empty_frame() -> ResultFrame {
    ResultFrame::empty(Schema::from_columns(vec![Column::new(
        "id",
        LogicalType::Int,
    )]))
}
