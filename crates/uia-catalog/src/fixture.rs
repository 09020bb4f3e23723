//! Seed taxonomy and insight vault data.
//!
//! The employment category / skill tree is a direct port of
//! `seed_vault.py::example_vault` (single `ec_ds` "Data Scientist" category,
//! 12 skills). The insight batches are a direct port of the two batches
//! defined in `scripts/seed_insight_vault.py` (one the file's live
//! `SAMPLE_BATCH`, one its preceding commented-out sample) — both are
//! legitimate vault content, so both ship as active batches here to give the
//! demo catalog enough breadth to exercise multi-batch touched/pending flows.

use std::collections::HashMap;

use uia_core::model::{EmploymentCategory, Insight, InsightAnswer, InsightBatch, Skill};

const VAULT_VERSION: &str = "v1";

pub fn vault_version() -> String {
    VAULT_VERSION.to_string()
}

pub fn seed_categories() -> Vec<EmploymentCategory> {
    vec![EmploymentCategory {
        id: "ec_ds".to_string(),
        name: "Data Scientist".to_string(),
        description: Some(
            "Build data products and insights using statistics, ML, and software.".to_string(),
        ),
        aliases: vec![
            "data scientist".to_string(),
            "ds".to_string(),
            "ml scientist".to_string(),
        ],
        skills: vec![
            skill(
                "sk_prog_wrangling",
                "Programming & data wrangling",
                &["python", "pandas", "numpy", "data wrangling"],
            ),
            skill(
                "sk_stats_math",
                "Statistics & math",
                &["statistics", "probability", "linear algebra"],
            ),
            skill(
                "sk_ml_fundamentals",
                "Machine learning fundamentals",
                &["machine learning", "ml basics", "supervised", "unsupervised"],
            ),
            skill(
                "sk_dl_genai",
                "Deep learning & GenAI",
                &["deep learning", "neural networks", "genai", "llms"],
            ),
            skill(
                "sk_data_eng_basics",
                "Data engineering basics",
                &["data engineering", "etl", "pipelines", "sql"],
            ),
            skill(
                "sk_mlops",
                "MLOps / productionization",
                &["mlops", "deployment", "model serving", "monitoring"],
            ),
            skill("sk_cloud_platforms", "Cloud & platforms", &["cloud", "aws", "gcp", "azure"]),
            skill(
                "sk_analytics_experimentation",
                "Analytics & experimentation",
                &["ab testing", "experimentation", "causal inference"],
            ),
            skill(
                "sk_viz_storytelling",
                "Visualization & storytelling",
                &["data viz", "visualization", "dashboards", "storytelling"],
            ),
            skill(
                "sk_responsible_ai",
                "Responsible AI, privacy & security",
                &["responsible ai", "ai ethics", "privacy", "security"],
            ),
            skill(
                "sk_domain_business",
                "Domain knowledge & business sense",
                &["domain knowledge", "business sense", "product thinking"],
            ),
            skill(
                "sk_collab_soft_skills",
                "Collaboration & soft skills",
                &["communication", "collaboration", "soft skills", "teamwork"],
            ),
        ],
    }]
}

fn skill(id: &str, name: &str, aliases: &[&str]) -> Skill {
    Skill {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn seed_batches() -> Vec<InsightBatch> {
    vec![
        InsightBatch {
            batch_id: "learning_architecture_process_feedback".to_string(),
            name: "Learning Architecture, Process & Feedback".to_string(),
            language: "en".to_string(),
            vault_version: vault_version(),
            is_active: true,
            insights: vec![
                insight(
                    "learning_architecture_components",
                    "learning_architecture_process_feedback",
                    "Which components do you currently have?",
                    true,
                    &[
                        ("A", "Curriculum/sequence", &["curriculum"]),
                        ("B", "Weekly plan", &["plan", "schedule"]),
                        ("C", "Milestones/rubrics", &["milestones", "goals"]),
                        ("D", "Feedback channel", &["feedback"]),
                        ("E", "Reflection log", &["log", "journal"]),
                        ("F", "None of these", &["none"]),
                    ],
                ),
                insight(
                    "process_bottlenecks",
                    "learning_architecture_process_feedback",
                    "Which bottlenecks slow you down most?",
                    true,
                    &[
                        ("A", "Unclear SOPs", &["sops", "unclear process"]),
                        ("B", "Context switching", &["multitasking", "switching"]),
                        ("C", "Tool fragmentation", &["tools", "fragmentation"]),
                        ("D", "Rework/redo", &["rework", "mistakes"]),
                        ("E", "Waiting on others", &["waiting", "dependencies"]),
                        ("F", "Lack of templates", &["templates"]),
                        ("G", "Other", &["other reason"]),
                    ],
                ),
                insight(
                    "feedback_availability",
                    "learning_architecture_process_feedback",
                    "How available is timely, honest feedback on your work?",
                    false,
                    &[
                        ("A", "Not available", &["none", "not available"]),
                        ("B", "rarely", &["rarely"]),
                        ("C", "sometimes", &["sometimes"]),
                        ("D", "often", &["often"]),
                        ("E", "Plentiful and timely", &["plentiful", "always"]),
                    ],
                ),
            ],
        },
        InsightBatch {
            batch_id: "cognitive_preferences_problem_solving".to_string(),
            name: "Cognitive Preferences & Problem-Solving".to_string(),
            language: "en".to_string(),
            vault_version: vault_version(),
            is_active: true,
            insights: vec![
                insight(
                    "primary_learning_modes",
                    "cognitive_preferences_problem_solving",
                    "Primary learning modes that stick for you",
                    true,
                    &[
                        ("A", "Reading", &["books", "articles"]),
                        ("B", "Videos", &["lectures", "tutorials"]),
                        ("C", "Audio/podcasts", &["audio", "podcasts"]),
                        ("D", "Hands-on practice", &["doing", "projects"]),
                        ("E", "Teaching/explaining", &["explaining", "teaching"]),
                        ("F", "Visual diagrams", &["diagrams", "visuals"]),
                        ("G", "Worked examples", &["examples"]),
                    ],
                ),
                insight(
                    "concept_introduction_preference",
                    "cognitive_preferences_problem_solving",
                    "How you want new concepts introduced",
                    false,
                    &[
                        ("A", "Big picture -> details", &["top-down", "macro-first"]),
                        ("B", "Concrete example -> principle", &["example-first"]),
                        ("C", "Step-by-step from basics", &["basics-first", "bottom-up"]),
                        ("D", "Compare/contrast with what I already know", &["analogy", "compare"]),
                    ],
                ),
                insight(
                    "problem_solving_posture",
                    "cognitive_preferences_problem_solving",
                    "Problem-solving posture",
                    false,
                    &[
                        ("A", "Divergent (generate many ideas)", &["brainstorming", "ideation"]),
                        ("B", "Convergent (narrow to one best)", &["analytical", "precision"]),
                        ("C", "Balanced", &["both", "flexible"]),
                    ],
                ),
                insight(
                    "unstick_preference",
                    "cognitive_preferences_problem_solving",
                    "When you get stuck, what usually helps first?",
                    false,
                    &[
                        ("A", "Search docs/examples", &["search", "google"]),
                        ("B", "Restate/simplify the problem", &["restate", "simplify"]),
                        ("C", "Sketch a diagram", &["draw", "visualize"]),
                        ("D", "Compare to a prior pattern", &["pattern-matching", "compare"]),
                        ("E", "Ask for a targeted hint", &["hint", "ask"]),
                    ],
                ),
                insight(
                    "practice_limiters",
                    "cognitive_preferences_problem_solving",
                    "What most limits your consistent practice?",
                    true,
                    &[
                        ("A", "Low energy/fatigue", &["tired", "fatigue"]),
                        ("B", "Stress/overload", &["stress", "overwhelmed"]),
                        ("C", "Environment/noise", &["distractions", "noise"]),
                        ("D", "Competing obligations", &["no time", "busy"]),
                        ("E", "Health concerns", &["health", "sickness"]),
                        ("F", "Irregular schedule", &["schedule", "unpredictable"]),
                        ("G", "Other", &["other reason"]),
                    ],
                ),
            ],
        },
    ]
}

fn insight(
    insight_id: &str,
    batch_id: &str,
    question: &str,
    is_multi_select: bool,
    answers: &[(&str, &str, &[&str])],
) -> Insight {
    let mut map = HashMap::new();
    let mut order = Vec::new();
    for (id, text, aliases) in answers {
        order.push(id.to_string());
        map.insert(
            id.to_string(),
            InsightAnswer {
                text: text.to_string(),
                aliases: aliases.iter().map(|s| s.to_string()).collect(),
            },
        );
    }
    Insight {
        insight_id: insight_id.to_string(),
        batch_id: batch_id.to_string(),
        question: question.to_string(),
        is_multi_select,
        answers: map,
        answer_order: order,
    }
}
