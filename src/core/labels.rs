use crate::domain::model::Locale;
use chrono::{Datelike, NaiveDate, Weekday};

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(locale: Locale, month: u32) -> &'static str {
    let names = match locale {
        Locale::PtBr => &MONTHS_PT_BR,
        Locale::En => &MONTHS_EN,
    };
    names[(month.clamp(1, 12) - 1) as usize]
}

pub fn weekday_name(locale: Locale, weekday: Weekday) -> &'static str {
    match (locale, weekday) {
        (Locale::PtBr, Weekday::Mon) => "segunda-feira",
        (Locale::PtBr, Weekday::Tue) => "terça-feira",
        (Locale::PtBr, Weekday::Wed) => "quarta-feira",
        (Locale::PtBr, Weekday::Thu) => "quinta-feira",
        (Locale::PtBr, Weekday::Fri) => "sexta-feira",
        (Locale::PtBr, Weekday::Sat) => "sábado",
        (Locale::PtBr, Weekday::Sun) => "domingo",
        (Locale::En, Weekday::Mon) => "Monday",
        (Locale::En, Weekday::Tue) => "Tuesday",
        (Locale::En, Weekday::Wed) => "Wednesday",
        (Locale::En, Weekday::Thu) => "Thursday",
        (Locale::En, Weekday::Fri) => "Friday",
        (Locale::En, Weekday::Sat) => "Saturday",
        (Locale::En, Weekday::Sun) => "Sunday",
    }
}

/// "Dia 15 de março" / "March 15".
pub fn selected_date_label(locale: Locale, date: NaiveDate) -> String {
    match locale {
        Locale::PtBr => format!("Dia {:02} de {}", date.day(), month_name(locale, date.month())),
        Locale::En => format!("{} {:02}", month_name(locale, date.month()), date.day()),
    }
}

pub fn selected_weekday_label(locale: Locale, date: NaiveDate) -> String {
    weekday_name(locale, date.weekday()).to_string()
}

pub fn today_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Hoje",
        Locale::En => "Today",
    }
}

pub fn empty_period_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Nenhum agendamento neste período.",
        Locale::En => "No appointments in this period.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portuguese_labels() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(selected_date_label(Locale::PtBr, date), "Dia 05 de março");
        assert_eq!(selected_weekday_label(Locale::PtBr, date), "sexta-feira");
    }

    #[test]
    fn test_english_labels() {
        let date = NaiveDate::from_ymd_opt(2021, 12, 25).unwrap();
        assert_eq!(selected_date_label(Locale::En, date), "December 25");
        assert_eq!(selected_weekday_label(Locale::En, date), "Saturday");
    }
}
