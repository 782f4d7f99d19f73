//! Embedded demo dataset used when no datastore is configured or loading fails.

use crate::{DirectorySnapshot, InsuranceSet, Organization, Provider};

fn insurances(names: &[&str]) -> InsuranceSet {
    names.iter().copied().collect()
}

#[allow(clippy::too_many_arguments)]
fn provider(
    id: &str,
    name: &str,
    specialty: &str,
    phone: &str,
    address: &str,
    npi: &str,
    accepted: &[&str],
    organization_id: Option<&str>,
) -> Provider {
    Provider {
        id: id.into(),
        name: name.into(),
        specialty: specialty.into(),
        phone: phone.into(),
        address: address.into(),
        npi: Some(npi.into()),
        insurances: insurances(accepted),
        organization_id: organization_id.map(Into::into),
    }
}

/// The fixed demo directory: two organizations, one independent provider and the default
/// insurance catalog.
pub fn snapshot() -> DirectorySnapshot {
    let central = Organization {
        id: "1".into(),
        name: "Central Medical Group".into(),
        phone: "(555) 123-4567".into(),
        address: "123 Main St, Suite 100".into(),
        npi: Some("1234567890".into()),
        insurances: insurances(&["Molina Marketplace", "Molina Medicaid", "Blue Cross", "Medicare"]),
        providers: vec![
            provider(
                "101",
                "Dr. Sarah Smith",
                "Dermatology",
                "(555) 123-4567",
                "123 Main St, Suite 100",
                "1234567891",
                &["Molina Marketplace", "Blue Cross"],
                Some("1"),
            ),
            provider(
                "102",
                "Dr. Michael Johnson",
                "Internal Medicine",
                "(555) 123-4567",
                "123 Main St, Suite 100",
                "1234567892",
                &["Medicare", "Molina Medicaid"],
                Some("1"),
            ),
        ],
    };

    let skin_care = Organization {
        id: "2".into(),
        name: "Skin Care Specialists".into(),
        phone: "(555) 234-5678".into(),
        address: "456 Oak Ave, Floor 2".into(),
        npi: Some("1234567893".into()),
        insurances: insurances(&["Molina Marketplace", "United Healthcare", "Cigna"]),
        providers: vec![provider(
            "201",
            "Dr. Emily Chen",
            "Dermatology",
            "(555) 234-5678",
            "456 Oak Ave, Floor 2",
            "1234567894",
            &["Molina Marketplace", "Cigna"],
            Some("2"),
        )],
    };

    let martinez = provider(
        "401",
        "Dr. James Martinez",
        "Orthopedic Surgery",
        "(555) 456-7890",
        "321 Elm St, Suite 5",
        "1234567895",
        &["Molina Medicaid", "Blue Cross", "United Healthcare"],
        None,
    );

    DirectorySnapshot {
        organizations: vec![central, skin_care],
        independent_providers: vec![martinez],
        insurance_names: [
            "Molina Marketplace",
            "Molina Medicaid",
            "Blue Cross Blue Shield",
            "Medicare",
            "Medicaid",
            "Aetna",
            "United Healthcare",
            "Cigna",
            "Humana",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect(),
    }
}
