// src/models/dataset.rs

use serde::{Deserialize, Serialize};

use crate::models::{
    auth::User,
    crm::{Customer, Deal},
};

/// O conjunto completo de coleções. É exatamente o formato do documento JSON
/// do modo arquivo e também o que o gerador de dados fictícios produz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub deals: Vec<Deal>,
}
