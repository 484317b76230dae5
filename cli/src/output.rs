use anyhow::Result;
use colored::Colorize;
use comfy_table::{
    modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS},
    presets::UTF8_FULL,
    Cell, Color, Table,
};
use roaya_types::{Admin, Permission, User};
use serde::Serialize;

use crate::config::OutputFormat;

pub fn print_users(users: Vec<User>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_users_table(users),
        OutputFormat::Json => print_json(&users),
    }
}

pub fn print_user(user: User, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_users_table(vec![user]),
        OutputFormat::Json => print_json(&user),
    }
}

pub fn print_permissions(permissions: Vec<Permission>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_permissions_table(permissions),
        OutputFormat::Json => print_json(&permissions),
    }
}

pub fn print_permission(permission: Permission, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_permissions_table(vec![permission]),
        OutputFormat::Json => print_json(&permission),
    }
}

pub fn print_admin(admin: &Admin, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{} {} <{}>",
                "Logged in as".green(),
                admin.name.bold(),
                admin.email
            );
            Ok(())
        }
        OutputFormat::Json => print_json(admin),
    }
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_header(
            header
                .iter()
                .map(|h| Cell::new(h).fg(Color::Blue))
                .collect::<Vec<_>>(),
        );
    table
}

fn print_users_table(users: Vec<User>) -> Result<()> {
    let mut table = table(&["ID", "NAME", "EMAIL", "ROLE", "CREATED"]);

    for user in users {
        let role_cell = match &user.role_id {
            Some(role) => Cell::new(role),
            None => Cell::new("-").fg(Color::Grey),
        };

        table.add_row(vec![
            Cell::new(&user.id),
            Cell::new(&user.name),
            Cell::new(&user.email),
            role_cell,
            Cell::new(&user.created_at),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn print_permissions_table(permissions: Vec<Permission>) -> Result<()> {
    let mut table = table(&["ID", "NAME", "CONTENT"]);

    for permission in permissions {
        table.add_row(vec![
            Cell::new(&permission.id),
            Cell::new(&permission.name),
            Cell::new(permission.content.unwrap_or_default()),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
