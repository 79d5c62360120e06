//! Prompt construction for cost estimation.
//!
//! A fixed table maps exact procedure names to extra guidance for the model.
//! Unknown names fall back to a generic elaboration; matching is
//! case-sensitive and never fuzzy.

/// Procedure-specific guidance appended to the prompt.
const PROCEDURE_GUIDANCE: &[(&str, &str)] = &[
    ("Appendectomy", "Include information about laparoscopic vs. open procedures, typical hospital stay duration, and potential complications such as infection or abscess."),
    ("Colonoscopy", "Include information about sedation options, polyp removal costs, and the importance of follow-up appointments."),
    ("Hip Replacement", "Discuss different types of implants (ceramic, metal, plastic), rehabilitation costs, and potential complications like dislocation or infection."),
    ("Knee Replacement", "Include information about partial vs. total knee replacement, rehabilitation costs, and potential complications like blood clots or infection."),
    ("MRI Scan", "Discuss differences in costs for various body parts, contrast vs. non-contrast scans, and potential additional readings or interpretations."),
    ("CT Scan", "Include information about contrast vs. non-contrast scans, radiation exposure, and potential additional costs for specialized CT procedures."),
    ("Cataract Surgery", "Discuss different types of intraocular lenses, potential need for glasses post-surgery, and follow-up care costs."),
    ("Childbirth (Vaginal Delivery)", "Include information about epidural costs, potential complications like C-section conversion, and postpartum care."),
    ("Childbirth (C-Section)", "Discuss planned vs. emergency C-section costs, longer hospital stay, and potential complications like infection or blood loss."),
    ("Dental Cleaning", "Include information about basic cleaning vs. deep cleaning, potential X-ray costs, and frequency recommendations."),
    ("Root Canal", "Discuss costs for different types of teeth (molars vs. front teeth), potential need for a crown, and follow-up visits."),
    ("Dental Crown", "Include information about different materials (porcelain, metal, ceramic), preparation costs, and temporary crown expenses."),
    ("Tooth Extraction", "Discuss simple vs. surgical extraction costs, potential need for sedation, and post-extraction care."),
    ("Physical Therapy Initial Evaluation", "Include information about assessment duration, potential tests or measurements, and treatment plan development."),
    ("Physical Therapy Follow-up Session", "Discuss typical session duration, potential equipment or modality costs, and at-home exercise recommendations."),
    ("Annual Physical Exam", "Include information about routine lab work, potential vaccinations, and preventive screenings based on age and gender."),
    ("Mammogram", "Discuss 2D vs. 3D mammography costs, potential need for additional imaging, and frequency recommendations."),
    ("Flu Shot", "Include information about different vaccine types (standard, high-dose for seniors), potential side effects, and effectiveness."),
    ("Cholesterol Screening", "Discuss fasting vs. non-fasting tests, additional lipid panel components, and frequency recommendations based on risk factors."),
];

/// Guidance used for any procedure not in the table.
pub const GENERIC_GUIDANCE: &str = "Provide detailed information about the procedure, including common variations, potential complications, and factors that might affect the cost.";

const SCHEMA_INSTRUCTIONS: &str = "Provide the estimate as a JSON object with the following keys:\n\
'procedure_name', 'procedure_code', 'zip_code', 'low_estimate', 'high_estimate', 'typical_insurance_cost',\n\
'common_complications', 'alternative_procedures', 'recovery_info', 'additional_info'.\n\
For 'common_complications', provide an array of objects, each containing 'name' and 'estimated_cost'.\n\
For 'alternative_procedures', provide an array of objects, each containing 'name' and 'estimated_cost_range' (an array with two numbers).\n\
For 'recovery_info', provide an object with 'estimated_time' and 'associated_costs'.\n\
All cost values should be positive numbers without currency symbols.\n\
Use null for any information that is not applicable or cannot be determined.";

/// Look up the elaboration clause for `procedure`.
pub fn procedure_guidance(procedure: &str) -> &'static str {
    PROCEDURE_GUIDANCE
        .iter()
        .find(|(name, _)| *name == procedure)
        .map(|(_, guidance)| *guidance)
        .unwrap_or(GENERIC_GUIDANCE)
}

/// Procedure names with dedicated guidance, in table order.
pub fn known_procedures() -> Vec<&'static str> {
    PROCEDURE_GUIDANCE.iter().map(|(name, _)| *name).collect()
}

/// Build the full estimation prompt.
pub fn build_prompt(procedure: &str, zip_code: &str, procedure_code: &str) -> String {
    let mut prompt = String::with_capacity(1500);

    prompt.push_str(&format!(
        "Estimate the cost of {procedure} in ZIP code {zip_code}.\n"
    ));

    if !procedure_code.is_empty() {
        prompt.push_str(&format!("The procedure code is {procedure_code}.\n"));
    }

    prompt.push_str(procedure_guidance(procedure));
    prompt.push('\n');
    prompt.push_str(SCHEMA_INSTRUCTIONS);

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
