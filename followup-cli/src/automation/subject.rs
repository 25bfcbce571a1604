const MONTHS: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARÇO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

/// Subject typed into every follow-up of a run, for a 1-based month
pub fn follow_up_subject(month: u32) -> String {
    let name = MONTHS[(month.clamp(1, 12) - 1) as usize];
    format!("COBRANÇA PARCELA - {}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_months() {
        let expected = [
            "COBRANÇA PARCELA - JANEIRO",
            "COBRANÇA PARCELA - FEVEREIRO",
            "COBRANÇA PARCELA - MARÇO",
            "COBRANÇA PARCELA - ABRIL",
            "COBRANÇA PARCELA - MAIO",
            "COBRANÇA PARCELA - JUNHO",
            "COBRANÇA PARCELA - JULHO",
            "COBRANÇA PARCELA - AGOSTO",
            "COBRANÇA PARCELA - SETEMBRO",
            "COBRANÇA PARCELA - OUTUBRO",
            "COBRANÇA PARCELA - NOVEMBRO",
            "COBRANÇA PARCELA - DEZEMBRO",
        ];
        for (idx, subject) in expected.iter().enumerate() {
            assert_eq!(follow_up_subject(idx as u32 + 1), *subject);
        }
    }
}
