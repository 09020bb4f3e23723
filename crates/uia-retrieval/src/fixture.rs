//! Built-in demo corpus (§6 "offline-produced chunk records").
//!
//! A small, self-contained set of career-coaching chunks standing in for
//! the originating system's offline-chunked document set (`DOC01..DOC06`
//! under `4_chunks/`), so the workspace has something to retrieve against
//! without a separate ingestion pipeline.

use uia_core::model::{ChunkType, RetrievalChunk};

fn chunk(chunk_id: &str, doc_id: &str, breadcrumb: &str, section_path: &[&str], text: &str) -> RetrievalChunk {
    RetrievalChunk {
        chunk_id: chunk_id.to_string(),
        doc_id: doc_id.to_string(),
        version: "v1".to_string(),
        text: text.to_string(),
        embedding_text: text.to_string(),
        section_path: section_path.iter().map(|s| s.to_string()).collect(),
        breadcrumb: breadcrumb.to_string(),
        chunk_type: ChunkType::Text,
        token_count: text.split_whitespace().count() as u32,
    }
}

pub fn seed_chunks() -> Vec<RetrievalChunk> {
    vec![
        chunk(
            "DOC01:v1:0:0:a1f3c9",
            "DOC01",
            "Data Science Career Paths > Entry Routes",
            &["Data Science Career Paths", "Entry Routes"],
            "Most data scientists enter the field from one of three routes: a statistics or \
             math background, a software engineering background that picks up modeling, or a \
             domain-expert background that adds programming and analysis skills. Each route \
             front-loads a different weak spot: engineers often underweight statistical rigor, \
             statisticians often underweight production deployment, and domain experts often \
             underweight both.",
        ),
        chunk(
            "DOC01:v1:1:0:b7e221",
            "DOC01",
            "Data Science Career Paths > Leveling Up",
            &["Data Science Career Paths", "Leveling Up"],
            "Progression from junior to senior data scientist tracks less with tool mastery and \
             more with the ability to scope an ambiguous business question into a measurable \
             modeling problem, and to communicate uncertainty honestly to non-technical \
             stakeholders.",
        ),
        chunk(
            "DOC02:v1:0:0:c44aa0",
            "DOC02",
            "Core Skills & Tools > Programming & Data Wrangling",
            &["Core Skills & Tools", "Programming & Data Wrangling"],
            "Python with pandas and numpy remains the dominant data wrangling stack. SQL is not \
             optional — most real-world data lives behind it, and a data scientist who can't \
             write an efficient join spends inordinate time waiting on someone else's query.",
        ),
        chunk(
            "DOC02:v1:1:0:d9021f",
            "DOC02",
            "Core Skills & Tools > Statistics & Math",
            &["Core Skills & Tools", "Statistics & Math"],
            "Probability, hypothesis testing, and linear algebra underpin every model family in \
             common use. Causal inference — understanding when correlation in the data does and \
             doesn't imply a causal story — separates analyses that hold up under scrutiny from \
             ones that don't.",
        ),
        chunk(
            "DOC02:v1:2:0:e1b6aa",
            "DOC02",
            "Core Skills & Tools > Machine Learning Fundamentals",
            &["Core Skills & Tools", "Machine Learning Fundamentals"],
            "Supervised learning (regression, classification) and unsupervised learning \
             (clustering, dimensionality reduction) form the baseline vocabulary. Understanding \
             bias-variance tradeoff and cross-validation matters more for day-to-day work than \
             familiarity with any single exotic algorithm.",
        ),
        chunk(
            "DOC02:v1:3:0:f3c810",
            "DOC02",
            "Core Skills & Tools > Deep Learning & GenAI",
            &["Core Skills & Tools", "Deep Learning & GenAI"],
            "Neural networks and large language models have become a standard part of the data \
             scientist's toolkit for unstructured data (text, images). Knowing when a simpler \
             classical model outperforms a deep model with less data and less latency is itself \
             a skill.",
        ),
        chunk(
            "DOC03:v1:0:0:a0b1c2",
            "DOC03",
            "MLOps & Responsible AI > Productionization",
            &["MLOps & Responsible AI", "Productionization"],
            "MLOps covers model serving, monitoring for data and concept drift, and automated \
             retraining pipelines. A model that scores well offline but isn't monitored in \
             production tends to degrade silently as the input distribution shifts.",
        ),
        chunk(
            "DOC03:v1:1:0:d4e5f6",
            "DOC03",
            "MLOps & Responsible AI > Cloud & Platforms",
            &["MLOps & Responsible AI", "Cloud & Platforms"],
            "AWS, GCP, and Azure each provide managed training and serving infrastructure. The \
             underlying concepts — containerized training jobs, managed feature stores, \
             autoscaled inference endpoints — transfer across providers even though the exact \
             APIs don't.",
        ),
        chunk(
            "DOC03:v1:2:0:g7h8i9",
            "DOC03",
            "MLOps & Responsible AI > Responsible AI",
            &["MLOps & Responsible AI", "Responsible AI"],
            "Responsible AI practice means auditing models for disparate impact across \
             protected groups, documenting known limitations, and treating data privacy as a \
             design constraint rather than an afterthought bolted on before a compliance review.",
        ),
        chunk(
            "DOC04:v1:0:0:j1k2l3",
            "DOC04",
            "Analytics & Storytelling > Experimentation",
            &["Analytics & Storytelling", "Experimentation"],
            "A/B testing and experimentation design let a team distinguish a real effect from \
             noise. Underpowered experiments and peeking at results before the planned sample \
             size is reached are the two most common ways teams fool themselves.",
        ),
        chunk(
            "DOC04:v1:1:0:m4n5o6",
            "DOC04",
            "Analytics & Storytelling > Visualization",
            &["Analytics & Storytelling", "Visualization"],
            "Good data visualization chooses the chart that matches the comparison being made — \
             a line for trends over time, a bar for category comparisons — rather than defaulting \
             to whatever the charting library renders first. Dashboards aimed at executives \
             should lead with the decision the numbers inform, not the numbers themselves.",
        ),
        chunk(
            "DOC05:v1:0:0:p7q8r9",
            "DOC05",
            "Collaboration & Business Sense > Working With Stakeholders",
            &["Collaboration & Business Sense", "Working With Stakeholders"],
            "Translating a vague stakeholder ask ('can we predict churn?') into a concrete, \
             scoped modeling task is as much a communication skill as a technical one. Domain \
             knowledge about how the business actually operates often matters more for project \
             success than the choice of algorithm.",
        ),
    ]
}
