//! Element locators and page paths of the Sponte portal

pub const HOME_PATH: &str = "/Home.aspx";

pub const LOGIN_EMAIL_ID: &str = "txtLogin";
pub const LOGIN_PASSWORD_ID: &str = "txtSenha";
pub const LOGIN_BUTTON_ID: &str = "btnok";

pub const ENTERPRISE_LABEL_ID: &str = "ctl00_spnNomeEmpresa";

pub const FOLLOW_UP_TAB_XPATH: &str = "//*[@id='__tab_tab_TabPanel9']";
pub const FOLLOW_UP_INCLUDE_ID: &str = "tab_TabPanel9_btnIncluirFollowUp_div";
pub const FOLLOW_UP_FRAME_XPATH: &str = "//iframe[contains(@src,'FollowUpCadastro.aspx')]";

pub const ATTENDANT_SELECT_ID: &str = "cmbAtendente";
pub const CONTACT_TYPE_SELECT_ID: &str = "cmbTipoContato";
pub const SCHEDULE_TYPE_SELECT_ID: &str = "cmbTipoAgendamento";
pub const INTEREST_SELECT_ID: &str = "cmbGrauInteresse";
pub const SUBJECT_ID: &str = "txtAssunto";

pub const MODAL_SAVE_CSS: &str = "#updRodapeFixo #btnSalvar_div";
pub const RECORD_SAVE_CSS: &str = "#updRodapeRelativo #btnSalvar_div";

pub const SCROLL_AND_CLICK_JS: &str =
    "arguments[0].scrollIntoView({block:'center'}); arguments[0].click();";

/// Student record page for an AlunoID
pub fn student_path(student_id: &str) -> String {
    format!("/SPCad/AlunoCadastro.aspx?cad=true&id={}&ce=1", student_id)
}

/// Script that selects an office and posts the header form back
pub fn office_switch_script(code: u8) -> String {
    format!(
        "$('#ctl00_hdnEmpresa').val({}); __doPostBack('ctl00$lnkChange','');",
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_path() {
        assert_eq!(student_path("4321"), "/SPCad/AlunoCadastro.aspx?cad=true&id=4321&ce=1");
    }

    #[test]
    fn test_office_switch_script() {
        assert_eq!(
            office_switch_script(3),
            "$('#ctl00_hdnEmpresa').val(3); __doPostBack('ctl00$lnkChange','');"
        );
    }
}
