//! Test fixtures for engine integration tests
//!
//! A small but realistic shop schema with every object kind, plus helpers
//! for producing reordered copies of it.

#![allow(dead_code)]

use schemadiff_core::{
    Column, Constraint, ConstraintType, DatabaseType, Function, Index, Parameter,
    ParameterDirection, Procedure, Schema, Sequence, Table, Trigger, TriggerEvent, TriggerTiming,
    View,
};

/// Users table with a primary key, a unique email and a lookup index
pub fn users_table() -> Table {
    Table::new("users")
        .in_schema("public")
        .with_column(Column::new("id", "integer").primary_key().auto_increment().with_position(1))
        .with_column(Column::new("email", "varchar(255)").with_nullable(false).unique().with_position(2))
        .with_column(Column::new("name", "varchar(50)").with_position(3))
        .with_column(
            Column::new("created_at", "timestamp")
                .with_nullable(false)
                .with_default("CURRENT_TIMESTAMP")
                .with_position(4),
        )
        .with_constraint(Constraint::primary_key("pk_users", ["id"]))
        .with_constraint(Constraint::new("uq_users_email", ConstraintType::Unique, ["email"]))
        .with_index(Index::new("idx_users_name_created", "users", ["name", "created_at"]))
        .with_comment("Registered customers")
}

/// Orders table referencing users
pub fn orders_table() -> Table {
    Table::new("orders")
        .in_schema("public")
        .with_column(Column::new("id", "bigint").primary_key().with_position(1))
        .with_column(Column::new("user_id", "integer").with_nullable(false).with_position(2))
        .with_column(Column::new("total", "numeric(10,2)").with_nullable(false).with_position(3))
        .with_column(Column::new("status", "varchar(20)").with_default("'pending'").with_position(4))
        .with_constraint(Constraint::primary_key("pk_orders", ["id"]))
        .with_constraint(
            Constraint::foreign_key("fk_orders_users", ["user_id"], "users", ["id"])
                .with_actions(None, Some("CASCADE")),
        )
        .with_constraint(Constraint::check("ck_orders_total", "total >= 0"))
        .with_index(Index::new("idx_orders_user", "orders", ["user_id"]))
}

/// A schema exercising every object kind
pub fn shop_schema() -> Schema {
    Schema::new("shop", DatabaseType::Postgresql)
        .with_table(users_table())
        .with_table(orders_table())
        .with_view(View::new(
            "active_users",
            "SELECT id, email FROM users WHERE created_at > now() - interval '30 days'",
        ))
        .with_index(Index::new("idx_orders_status", "orders", ["status", "id"]).with_type("btree"))
        .with_sequence(Sequence::new("order_number_seq"))
        .with_procedure(
            Procedure::new("archive_orders", "DELETE FROM orders WHERE status = 'archived'")
                .with_parameter(Parameter::new("cutoff", "date")),
        )
        .with_function(
            Function::new("order_total", "numeric", "SELECT sum(total) FROM orders WHERE user_id = uid")
                .with_parameter(Parameter::new("uid", "integer"))
                .with_parameter(Parameter::new("result", "numeric").with_direction(ParameterDirection::Out)),
        )
        .with_trigger(Trigger::new(
            "trg_orders_audit",
            "orders",
            TriggerEvent::Update,
            TriggerTiming::After,
            "EXECUTE FUNCTION audit()",
        ))
}

/// Deep copy with every collection and every unordered column list reversed
pub fn reversed(schema: &Schema) -> Schema {
    let mut schema = schema.clone();

    schema.tables.reverse();
    for table in &mut schema.tables {
        table.columns.reverse();
        table.constraints.reverse();
        table.indexes.reverse();
        for index in &mut table.indexes {
            index.columns.reverse();
        }
        for constraint in &mut table.constraints {
            constraint.columns.reverse();
            constraint.referenced_columns.reverse();
        }
    }
    schema.views.reverse();
    schema.indexes.reverse();
    for index in &mut schema.indexes {
        index.columns.reverse();
    }
    schema.sequences.reverse();
    schema.procedures.reverse();
    for procedure in &mut schema.procedures {
        procedure.parameters.reverse();
    }
    schema.functions.reverse();
    for function in &mut schema.functions {
        function.parameters.reverse();
    }
    schema.triggers.reverse();

    schema
}
