// src/services/mock_data.rs

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        crm::{Customer, CustomerStatus, Deal, DealStatus, DEFAULT_CURRENCY},
        dataset::Dataset,
    },
    services::auth::AuthService,
};

pub const ADMIN_ID: &str = "user-admin-001";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

const CUSTOMER_COUNT: usize = 15;
const DEAL_COUNT: usize = 30;

const FIRST_NAMES: [&str; CUSTOMER_COUNT] = [
    "Max", "Lisa", "Michael", "Anna", "Thomas", "Sarah", "Daniel", "Julia", "Markus", "Laura",
    "Sebastian", "Maria", "Christian", "Sophie", "Andreas",
];

const LAST_NAMES: [&str; CUSTOMER_COUNT] = [
    "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker", "Schulz",
    "Hoffmann", "Koch", "Bauer", "Richter", "Klein", "Wolf",
];

const COMPANIES: [&str; CUSTOMER_COUNT] = [
    "Tech Solutions GmbH",
    "Digital Innovation AG",
    "Cloud Services Ltd",
    "Software Experts",
    "Web Development Co",
    "Data Analytics GmbH",
    "Mobile Apps AG",
    "IT Consulting",
    "E-Commerce Solutions",
    "Marketing Digital",
    "Design Studio",
    "Consulting Partners",
    "Business Solutions",
    "Enterprise Systems",
    "Development Group",
];

const DEAL_TITLES: [&str; DEAL_COUNT] = [
    "Website Redesign",
    "Mobile App Development",
    "Cloud Migration",
    "E-Commerce Platform",
    "CRM System Implementation",
    "Marketing Campaign",
    "SEO Optimization",
    "Data Analytics Dashboard",
    "API Integration",
    "Security Audit",
    "Performance Optimization",
    "Social Media Strategy",
    "Brand Identity",
    "Content Management System",
    "Email Marketing Platform",
    "Customer Portal",
    "Inventory Management",
    "Payment Gateway Integration",
    "Business Intelligence System",
    "Training Platform",
    "Support Ticketing System",
    "Video Streaming Service",
    "IoT Platform",
    "Blockchain Integration",
    "AI Chatbot",
    "Document Management",
    "HR Management System",
    "Project Management Tool",
    "Collaboration Platform",
    "Backup Solution",
];

const CUSTOMER_STATUSES: [CustomerStatus; 3] =
    [CustomerStatus::Active, CustomerStatus::Inactive, CustomerStatus::Lead];

const DEAL_STATUSES: [DealStatus; 4] =
    [DealStatus::Lead, DealStatus::InProgress, DealStatus::Won, DealStatus::Lost];

// Pseudo-aleatório derivado do índice: o mesmo índice sempre gera o mesmo valor
fn spread(index: usize, salt: u64, modulus: u64) -> u64 {
    let mut x = (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt;
    x ^= x >> 31;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 29;
    x % modulus
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub async fn generate_mock_users(auth: &AuthService) -> Result<Vec<User>, AppError> {
    let created_at = date(2024, 1, 1);

    Ok(vec![User {
        id: ADMIN_ID.to_string(),
        username: ADMIN_USERNAME.to_string(),
        email: "admin@portfolio-crm.com".to_string(),
        password_hash: auth.hash_password(ADMIN_PASSWORD).await?,
        created_at,
        updated_at: created_at,
    }])
}

pub fn generate_mock_customers() -> Vec<Customer> {
    (0..CUSTOMER_COUNT)
        .map(|i| {
            let first_name = FIRST_NAMES[i];
            let last_name = LAST_NAMES[i];
            let created_at = date(2024, 1, i as u32 + 1);

            Customer {
                id: format!("customer-{:03}", i + 1),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!("{}.{}@example.com", first_name.to_lowercase(), last_name.to_lowercase()),
                phone: Some(format!(
                    "+49 {} {}",
                    spread(i, 1, 900) + 100,
                    spread(i, 2, 9_000_000) + 1_000_000
                )),
                company: Some(COMPANIES[i].to_string()),
                status: CUSTOMER_STATUSES[i % CUSTOMER_STATUSES.len()],
                address: (i % 3 == 0).then(|| format!("Hauptstraße {}, {} Berlin", i + 10, 10115 + i * 10)),
                notes: (i % 4 == 0).then(|| "VIP Customer - High Priority".to_string()),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

pub fn generate_mock_deals(customers: &[Customer]) -> Vec<Deal> {
    if customers.is_empty() {
        return Vec::new();
    }

    (0..DEAL_COUNT)
        .map(|i| {
            let customer = &customers[i % customers.len()];
            let status = DEAL_STATUSES[i % DEAL_STATUSES.len()];
            let title = DEAL_TITLES[i];

            // 10k - 100k
            let value = Decimal::from(spread(i, 3, 90_000) + 10_000);
            let created_at = date(2024, (i / 5) as u32 + 1, (i % 28) as u32 + 1);
            let start_date = created_at + Duration::days(7);

            let end_date = matches!(status, DealStatus::Won | DealStatus::Lost).then(|| {
                let months = Months::new(spread(i, 4, 6) as u32 + 1);
                start_date.checked_add_months(months).unwrap_or(start_date)
            });

            let owner = customer
                .company
                .clone()
                .unwrap_or_else(|| format!("{} {}", customer.first_name, customer.last_name));

            Deal {
                id: format!("deal-{:03}", i + 1),
                title: title.to_string(),
                description: Some(format!("{title} project for {owner}")),
                value,
                currency: DEFAULT_CURRENCY.to_string(),
                status,
                customer_id: customer.id.clone(),
                start_date,
                end_date,
                notes: (i % 5 == 0).then(|| "Urgent - High Priority Deal".to_string()),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

/// Gera o dataset fictício completo (usuário admin, clientes e deals).
pub async fn generate_mock_data(auth: &AuthService) -> Result<Dataset, AppError> {
    let users = generate_mock_users(auth).await?;
    let customers = generate_mock_customers();
    let deals = generate_mock_deals(&customers);

    Ok(Dataset { users, customers, deals })
}
