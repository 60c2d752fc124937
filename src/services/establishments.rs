#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Establishment {
    pub code: i64,
    pub name: &'static str,
}

/// Establishments known to the scheduling provider, keyed by provider code.
pub const ESTABLISHMENTS: &[Establishment] = &[
    Establishment { code: 1, name: "CLINICA CREPALDI DERMATO" },
    Establishment { code: 2, name: "SPA CREPALDI" },
    Establishment { code: 5, name: "CLINICA DERMATO E CONVENIOS LTDA" },
    Establishment { code: 10, name: "DRIPS CLINIC" },
    Establishment { code: 11, name: "CREPALDI CLINICA DE ESTETICA LTDA" },
    Establishment { code: 12, name: "ESPACO BELA LASER" },
    Establishment { code: 14, name: "KLAYNE MOURA SERVICOS MEDICOS LTDA" },
];

// The CRM list field sends its internal element id, not the provider code.
const CRM_ELEMENT_IDS: &[(i64, i64)] = &[
    (238, 1),
    (240, 2),
    (242, 5),
    (244, 10),
    (246, 11),
    (248, 12),
    (8510, 14),
];

pub fn find(code: i64) -> Option<&'static Establishment> {
    ESTABLISHMENTS.iter().find(|e| e.code == code)
}

/// Translates a CRM list element id into the provider code. Provider codes and
/// unknown ids are returned unchanged.
pub fn resolve_code(code: i64) -> i64 {
    if find(code).is_some() {
        return code;
    }
    match CRM_ELEMENT_IDS.iter().find(|(element_id, _)| *element_id == code) {
        Some((_, provider_code)) => {
            tracing::debug!(element_id = code, provider_code, "translated CRM establishment id");
            *provider_code
        }
        None => code,
    }
}

/// Returns a warning for staff when the establishment cannot be trusted.
/// Never rejects: the booking goes ahead and the warning lands on the timeline.
pub fn check(code: Option<i64>, name: Option<&str>) -> Option<String> {
    let Some(code) = code else {
        return Some(format!(
            "Estabelecimento nao informado ({}) - verifique o agendamento!",
            name.unwrap_or("sem nome")
        ));
    };

    let Some(known) = find(code) else {
        return Some(format!(
            "Estabelecimento {code} ({}) pode estar incorreto!",
            name.unwrap_or("sem nome")
        ));
    };

    match name {
        Some(name) if fold(name) != fold(known.name) => Some(format!(
            "Estabelecimento {code} ({name}) pode estar incorreto! Esperado: {}",
            known.name
        )),
        _ => None,
    }
}

/// Uppercases, strips Portuguese diacritics and collapses whitespace.
fn fold(name: &str) -> String {
    let folded: String = name
        .chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
