//! Task instructions appended after the registry instruction.
//!
//! Placeholders in braces are replaced by the caller, as in `{topic}` or `{text}`.

/// Credit-score explanation for a rural borrower.
pub const EXPLAIN_CREDIT_TASK: &str =
    "Explain this credit score to a rural user in very simple language with local examples.";

pub const EXPLAIN_CREDIT_GUIDANCE: &str = r#"Create a friendly, encouraging explanation that:
1. Explains what the credit score means in simple terms
2. Uses local examples and analogies (farming, village life)
3. Highlights what they're doing well
4. Explains areas for improvement without being negative
5. Gives hope and motivation to improve
6. Uses respectful tone appropriate for rural Karnataka

Keep it conversational and under 200 words:"#;

pub const IMPROVEMENT_ADVICE_TASK: &str =
    "Provide personalized credit improvement advice for this rural user.";

/// Output shape for improvement advice; parsed into `ImprovementAdvice`.
pub const IMPROVEMENT_ADVICE_SCHEMA: &str = r#"{
    "immediate_actions": [
        {
            "action": "specific action to take now",
            "explanation": "why this helps in simple terms",
            "local_example": "example relevant to their occupation/location"
        }
    ],
    "short_term_goals": [
        {
            "goal": "what to achieve in 3-6 months",
            "steps": ["specific steps to take"],
            "benefit": "how this improves credit score"
        }
    ],
    "long_term_strategies": [
        {
            "strategy": "long-term financial habit",
            "timeline": "when to expect results",
            "seasonal_tip": "advice considering seasonal income if applicable"
        }
    ],
    "local_resources": [
        {
            "resource": "local institution or scheme",
            "how_to_access": "practical steps to access this resource",
            "benefit": "how it helps financial situation"
        }
    ],
    "motivation_message": "encouraging message in local context"
}"#;

pub const EDUCATION_CONTENT_TEMPLATE: &str = "Create educational content about: {topic}";

pub const EDUCATION_CONTENT_GUIDANCE: &str = r#"Create content that:
1. Explains the topic in very simple language
2. Uses local examples from Karnataka rural life
3. Gives practical, actionable advice
4. Includes stories or analogies they can relate to
5. Addresses common concerns of rural borrowers
6. Provides hope and motivation

Keep it conversational and under 300 words:"#;

pub const SEASONAL_TIPS_TASK: &str =
    "Generate 5 practical financial tips for this user based on the current season.";

pub const SEASONAL_TIPS_GUIDANCE: &str = r#"Consider:
- Seasonal income patterns in Karnataka agriculture
- Harvest times and cash flow
- Festival expenses and planning
- Weather-related financial risks

Provide tips as a simple list, each under 50 words:"#;

pub const ONBOARDING_EXTRACT_TASK: &str = "Extract the following information from the user's input and return it as a structured JSON. Fill only the fields mentioned by the user, leave others empty.";

pub const LOAN_RECOMMENDATION_TASK: &str =
    "As an MFI Risk Advisor, provide comprehensive loan recommendation with detailed analysis.";

/// Output shape for the detailed loan recommendation; parsed into `LoanRecommendation`.
pub const LOAN_RECOMMENDATION_SCHEMA: &str = r#"{
    "loan_recommendation": {
        "decision": "APPROVE/CONDITIONAL_APPROVE/REJECT",
        "confidence": "high/medium/low",
        "maximum_loan_amount": "recommended amount in rupees",
        "interest_rate_suggestion": "suggested rate percentage",
        "repayment_period": "recommended months",
        "collateral_requirement": "required/not_required/optional"
    },
    "detailed_risk_analysis": {
        "overall_risk_score": "numerical score 0-100",
        "risk_category": "very_low/low/medium/high/very_high",
        "key_risk_factors": [
            {
                "factor": "specific risk factor",
                "impact": "high/medium/low",
                "explanation": "detailed explanation of why this is risky",
                "mitigation_strategy": "how to reduce this risk"
            }
        ],
        "positive_factors": [
            {
                "factor": "positive aspect",
                "impact": "high/medium/low",
                "explanation": "why this reduces risk"
            }
        ]
    },
    "financial_health_assessment": {
        "income_stability": {
            "rating": "excellent/good/fair/poor",
            "reasoning": "detailed assessment of income consistency",
            "seasonal_considerations": "impact of seasonal variations"
        },
        "debt_capacity": {
            "current_debt_to_income": "calculated ratio",
            "recommended_max_emi": "amount in rupees",
            "debt_servicing_ability": "strong/moderate/weak"
        },
        "savings_pattern": {
            "assessment": "disciplined/irregular/poor",
            "emergency_fund_status": "adequate/inadequate/none",
            "recommendation": "specific advice for savings improvement"
        }
    },
    "detailed_recommendation_reasoning": {
        "primary_reasons_for_decision": ["main factor with detailed explanation"],
        "conditions_if_conditional_approval": [
            {
                "condition": "specific requirement",
                "rationale": "why this condition is necessary",
                "impact_if_not_met": "consequences"
            }
        ],
        "monitoring_requirements": [
            {
                "parameter": "what to monitor",
                "frequency": "how often",
                "action_triggers": "when to take action"
            }
        ]
    },
    "alternative_recommendations": {
        "if_rejected": [
            {
                "option": "alternative solution",
                "requirements": "what user needs to do",
                "timeline": "when to reapply"
            }
        ],
        "product_alternatives": [
            {
                "product": "alternative loan product",
                "suitability": "why this might be better",
                "terms": "different terms offered"
            }
        ]
    },
    "final_summary": {
        "executive_summary": "concise 2-3 sentence summary of recommendation",
        "key_next_steps": ["immediate actions for MFI"],
        "borrower_communication": "how to communicate decision to borrower"
    }
}"#;

pub const CREDIT_SCORING_TASK: &str =
    "Analyze this rural user profile for microfinance credit scoring. Score every factor from 0 to 100 and the overall credit score from 0 to 100.";

/// Output shape for model-backed scoring; numbers, not strings.
pub const CREDIT_SCORING_SCHEMA: &str = r#"{
    "credit_score": 0,
    "factor_scores": {
        "income_stability": 0,
        "repayment_history": 0,
        "social_capital": 0,
        "asset_ownership": 0,
        "financial_behavior": 0
    },
    "ai_analysis": {
        "strengths": ["list of positive factors"],
        "concerns": ["list of risk factors"],
        "unique_factors": ["special considerations for this profile"],
        "confidence_level": "high/medium/low"
    }
}"#;

pub const LOAN_TERMS_TASK: &str =
    "Explain these recommended loan terms to the borrower in two or three short, respectful sentences.";

pub const LOAN_TERMS_GUIDANCE: &str = r#"Mention the amount, the interest rate, the number of months, and the monthly EMI.
If a guarantor or collateral is required, say so plainly. Do not change any number.

Explanation:"#;

pub const CLARIFYING_QUESTIONS_TASK: &str = "Based on the missing information, ask 2-3 friendly clarifying questions to complete the user profile for microfinance services.";

pub const CLARIFYING_QUESTIONS_GUIDANCE: &str =
    "Generate friendly, simple questions that a rural user can easily understand and answer:";

pub const PROPERTY_PARSE_TASK: &str = "Parse this Karnataka property document and extract all relevant fields. Return as structured JSON.";

/// Output shape for a parsed property document.
pub const PROPERTY_DOCUMENT_SCHEMA: &str = r#"{
    "document_analysis": {
        "document_type": "patta_document/katha_certificate/revenue_record/survey_settlement/mutation_record/title_deed/sale_deed/gift_deed",
        "language_detected": "english/kannada/hindi",
        "confidence": "high/medium/low",
        "completeness": "complete/partial/incomplete"
    },
    "property_details": {
        "survey_number": "",
        "sub_division": "",
        "village": "",
        "taluk": "",
        "district": "",
        "total_area": "",
        "area_unit": "acres/guntas/cents",
        "land_classification": "Dry/Wet/Garden/Kumki/Sarkar/Inam/Government",
        "land_type": "irrigated/dry/garden/other"
    },
    "ownership_details": {
        "owner_name": "",
        "father_name": "",
        "ownership_type": "sole/joint/inheritance",
        "acquisition_mode": "purchase/inheritance/gift/allotment"
    },
    "encumbrances": {
        "mortgages": [],
        "loans_against_property": [],
        "legal_disputes": []
    }
}"#;

pub const OWNERSHIP_VERIFY_TASK: &str =
    "Verify property ownership by cross-matching property document data with the user profile.";

pub const OWNERSHIP_VERIFY_SCHEMA: &str = r#"{
    "ownership_verification": {
        "name_match": "exact/partial/no_match",
        "father_name_match": "exact/partial/no_match",
        "address_consistency": "consistent/inconsistent/insufficient_data",
        "verification_status": "verified/needs_verification/rejected"
    },
    "risk_factors": {
        "legal_disputes": "none/minor/major",
        "encumbrances": "clear/minor_liens/major_liens",
        "title_clarity": "clear/unclear/disputed"
    },
    "recommendations": {
        "loan_eligibility": "eligible/conditional/not_eligible",
        "additional_verification_needed": []
    },
    "confidence_score": 0
}"#;

pub const VOICE_QUERY_TASK: &str = r#"You are a helpful voice assistant for rural microfinance services. Answer user queries about:
- Loan applications and eligibility
- Documentation requirements
- Interest rates and repayment terms
- Savings and investment options
- Digital banking services
- Government schemes and subsidies

Keep responses simple, clear, and under 100 words for voice output.
Use practical examples relevant to rural Karnataka context."#;

pub const TRANSLATE_TO_ENGLISH_TEMPLATE: &str = r#"You are a professional translator for a rural microfinance system in Karnataka, India.

Task: Translate the following {source} text to English.

Rules:
1. Maintain the original meaning and context
2. Use simple, clear English suitable for rural microfinance
3. Preserve any technical terms related to banking/finance
4. If the text contains names or places, keep them as-is
5. Only provide the translation, no explanations

{source} text: {text}

English translation:"#;

pub const TRANSLATE_FROM_ENGLISH_TEMPLATE: &str = r#"You are a professional translator for a rural microfinance system in Karnataka, India.

Task: Translate the following English text to {target}.

Context: {register}

Rules:
1. Maintain the original meaning and context
2. Use respectful, polite language appropriate for rural customers
3. Preserve any technical terms but make them understandable
4. If the text contains English names or technical terms, keep them in parentheses
5. Only provide the translation, no explanations

English text: {text}

{target} translation:"#;

pub const RAG_BORROWER_ROLE: &str = "You are a helpful financial advisor assistant for microfinance borrowers in India. You help people understand loans, savings, financial planning, government schemes, and banking services. Provide clear, practical advice in simple language. Focus on microfinance, small business loans, savings accounts, and financial literacy. Always be encouraging and supportive.";

pub const RAG_LENDER_ROLE: &str = "You are an expert financial advisor for microfinance institutions (MFIs) and lenders in India. You provide insights on portfolio management, risk assessment, regulatory compliance, lending practices, and operational efficiency. Your responses should be professional and data-driven, helping MFIs make informed decisions about their lending operations.";

pub const RAG_GUIDANCE: &str = r#"Based on the knowledge base context and your expertise, provide a helpful, accurate, and practical response.
If the knowledge base doesn't contain specific information, use your general knowledge about Indian microfinance
and financial services. Always be honest if you're not certain about specific details.

Guidelines:
- Keep responses clear and actionable
- Use simple language (avoid too much jargon)
- Provide specific examples when possible
- Mention relevant government schemes or regulations when applicable
- Be encouraging and supportive
- If suggesting financial products, mention the need to verify current terms and conditions

Response:"#;

/// Fill a template's placeholders in order.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render(
            TRANSLATE_TO_ENGLISH_TEMPLATE,
            &[("source", "Hindi"), ("text", "नमस्ते")],
        );
        assert!(out.contains("Translate the following Hindi text to English."));
        assert!(out.contains("Hindi text: नमस्ते"));
        assert!(!out.contains("{source}"));
    }

    #[test]
    fn schemas_are_valid_json() {
        for schema in [
            IMPROVEMENT_ADVICE_SCHEMA,
            LOAN_RECOMMENDATION_SCHEMA,
            CREDIT_SCORING_SCHEMA,
            PROPERTY_DOCUMENT_SCHEMA,
            OWNERSHIP_VERIFY_SCHEMA,
        ] {
            assert!(serde_json::from_str::<serde_json::Value>(schema).is_ok());
        }
    }
}
