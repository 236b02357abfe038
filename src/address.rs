//! Normalized address records shared by every provider.

use std::fmt;

use crate::{config::ProviderId, errors::CepError};

/// A Brazilian postal code, stored as its eight digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    /// Parses `NNNNNNNN` or `NNNNN-NNN`, ignoring surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, CepError> {
        let trimmed = input.trim();
        let digits: String = match trimmed.split_once('-') {
            Some((head, tail)) if head.len() == 5 && tail.len() == 3 => {
                format!("{head}{tail}")
            }
            Some(_) => return Err(CepError::InvalidCep(input.to_string())),
            None => trimmed.to_string(),
        };

        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CepError::InvalidCep(input.to_string()));
        }

        Ok(Self(digits))
    }

    /// Returns the eight digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-independent address record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    /// State abbreviation (UF).
    pub region: String,
}

/// An [`Address`] tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResult {
    pub address: Address,
    pub source: ProviderId,
}

impl AddressResult {
    pub fn new(address: Address, source: ProviderId) -> Self {
        Self { address, source }
    }
}

impl fmt::Display for AddressResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.address;
        writeln!(f, "CEP: {}", a.postal_code)?;
        writeln!(f, "Logradouro: {}", a.street)?;
        writeln!(f, "Bairro: {}", a.neighborhood)?;
        writeln!(f, "Localidade: {}", a.city)?;
        writeln!(f, "UF: {}", a.region)?;
        write!(f, "Consulta feita por: {}", self.source)
    }
}
