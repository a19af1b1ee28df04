//! Judge prompts for the RAG metrics.
//!
//! Each template carries `{placeholder}` slots filled by the metric drivers
//! with simple string replacement. The few-shot examples pin the JSON output
//! format so the judgment parser sees a predictable shape.

/// Collection of prompts used by the metric drivers.
pub struct Prompts;

impl Prompts {
    /// Prompt to decompose a generated answer into atomic statements.
    pub fn statement_extraction() -> &'static str {
        r#"Create one or more statements from each sentence in the given answer.

Question: Who was Albert Einstein and what is he best known for?
Answer: He was a German-born theoretical physicist, widely acknowledged to be one of the greatest and most influential physicists of all time. He was best known for developing the theory of relativity, he also made important contributions to the development of quantum mechanics.
statements in JSON:
{
"statements": [
"Albert Einstein was born in Germany.",
"Albert Einstein was best known for his theory of relativity."
]
}

Question: Cadmium chloride is slightly soluble in this chemical, it is also called what?
Answer: alcohol
statements in JSON:
{
"statements": [
"Cadmium chloride is slightly soluble in alcohol."
]
}

Question: Were Shahul and Jithin of the same nationality?
Answer: They were from different countries.
statements in JSON:
{
"statements": [
"Shahul and Jithin were from different countries."
]
}

Question: {question}
Answer: {answer}
statements in JSON:"#
    }

    /// Prompt to judge each extracted statement against the retrieved context.
    ///
    /// Verdicts are Yes/No, with NULL reserved for statements the context
    /// cannot settle either way.
    pub fn nli_statements() -> &'static str {
        r#"Natural language inference.
Consider the given context and the following statements, then determine whether they are supported by the information present in the context. Provide a brief explanation for each statement before arriving at the verdict (Yes/No). Provide a final verdict for each statement in order at the end in the given format. Do not deviate from the specified format. Make sure to output correct JSON, mind the commas.

Context:
John is a student at XYZ University. He is pursuing a degree in Computer Science. He is enrolled in several courses this semester, including Data Structures, Algorithms, and Database Management. John is a diligent student and spends a significant amount of time studying and completing assignments. He often stays late in the library to work on his projects.
statement_1: John is majoring in Biology.
statement_2: John is taking a course on Artificial Intelligence.
statement_3: John is a dedicated student.
statement_4: John has a part-time job.
Answer:
[
{
"statement_1": "John is majoring in Biology.",
"reason": "John's major is explicitly mentioned as Computer Science. There is no information suggesting he is majoring in Biology.",
"verdict": "No"
},
{
"statement_2": "John is taking a course on Artificial Intelligence.",
"reason": "The context mentions the courses John is currently enrolled in, and Artificial Intelligence is not among them. Therefore it cannot be deduced that John is taking a course on AI.",
"verdict": "No"
},
{
"statement_3": "John is a dedicated student.",
"reason": "The context states that he spends a significant amount of time studying and completing assignments. It also mentions that he often stays late in the library to work on his projects, which implies dedication.",
"verdict": "Yes"
},
{
"statement_4": "John has a part-time job.",
"reason": "There is no information in the context about John having a part-time job.",
"verdict": "No"
}
]

Context:
Photosynthesis is a process used by plants, algae, and certain bacteria to convert light energy into chemical energy.
statement_1: Answer not found in the given context
Answer:
[
{
"statement_1": "Answer not found in the given context",
"reason": "The context does not provide enough information to determine the validity of the statement.",
"verdict": "NULL"
}
]

Context:
{context}
Statements:
{statements}
Answer:"#
    }

    /// Prompt to verify whether one retrieved passage is useful for
    /// answering the question.
    pub fn context_precision() -> &'static str {
        r#"Verify if the information in the given context is useful for answering the question.

Question: What are the health benefits of green tea?
Context:
This article explores the rich history of tea cultivation in China, tracing its roots back to the ancient dynasties. It discusses how different regions developed their unique tea varieties and brewing techniques. The article also touches on the cultural significance of tea in Chinese society and how it has become a symbol of hospitality and relaxation.
Verification:
{"reason":"The context, while informative about the history and cultural significance of tea in China, does not provide specific information about the health benefits of green tea. Thus it is not useful for answering the question about health benefits.", "verdict":"No"}

Question: How does photosynthesis work in plants?
Context:
Photosynthesis in plants is a complex process involving multiple steps. This paper explains how chlorophyll within the chloroplasts absorbs sunlight, which then drives the chemical reaction converting carbon dioxide and water into glucose and oxygen. It elaborates on the role of light and dark reactions, and how ATP and NADPH are produced during these processes.
Verification:
{"reason":"This context is extremely relevant and useful for answering the question. It directly addresses the mechanisms of photosynthesis, explaining the key components and processes involved.", "verdict":"Yes"}

Question: {question}
Context:
{context}
Verification:"#
    }

    /// Prompt to classify each sentence of the ground-truth answer as
    /// attributable to the retrieved context or not.
    pub fn context_recall() -> &'static str {
        r#"Given a context and an answer, analyze each sentence in the answer and classify whether the sentence can be attributed to the given context or not. Output the result in JSON format with a reason.

Question: What can you tell me about Albert Einstein?
Context: Albert Einstein (14 March 1879 - 18 April 1955) was a German-born theoretical physicist, widely held to be one of the greatest and most influential scientists of all time. Best known for developing the theory of relativity, he also made important contributions to quantum mechanics, and was thus a central figure in the revolutionary reshaping of the scientific understanding of nature that modern physics accomplished in the first decades of the twentieth century. His mass-energy equivalence formula E = mc2, which arises from relativity theory, has been called "the world's most famous equation". He received the 1921 Nobel Prize in Physics "for his services to theoretical physics, and especially for his discovery of the law of the photoelectric effect", a pivotal step in the development of quantum theory. His work is also known for its influence on the philosophy of science. In a 1999 poll of 130 leading physicists worldwide by the British journal Physics World, Einstein was ranked the greatest physicist of all time. His intellectual achievements and originality have made Einstein synonymous with genius.
Answer: Albert Einstein, born on 14 March 1879, was a German-born theoretical physicist, widely held to be one of the greatest and most influential scientists of all time. He received the 1921 Nobel Prize in Physics "for his services to theoretical physics. He published 4 papers in 1905. Einstein moved to Switzerland in 1895.
Classification:
[
{
"statement_1":"Albert Einstein, born on 14 March 1879, was a German-born theoretical physicist, widely held to be one of the greatest and most influential scientists of all time.",
"reason": "Einstein's date of birth is clearly mentioned in the context.",
"Attributed": "Yes"
},
{
"statement_2":"He received the 1921 Nobel Prize in Physics 'for his services to theoretical physics.",
"reason": "The exact sentence is present in the given context.",
"Attributed": "Yes"
},
{
"statement_3": "He published 4 papers in 1905.",
"reason": "There is no mention of the papers he wrote in the given context.",
"Attributed": "No"
},
{
"statement_4":"Einstein moved to Switzerland in 1895.",
"reason": "There is no supporting evidence for this in the given context.",
"Attributed": "No"
}
]

Question: Who won the ICC World Cup in 2020?
Context: Who won the 2022 ICC Men's T20 World Cup?
The 2022 ICC Men's T20 World Cup, held from October 16 to November 13, 2022, in Australia, was the eighth edition of the tournament. Originally scheduled for 2020, it was postponed due to the COVID-19 pandemic. England emerged victorious, defeating Pakistan by five wickets in the final to clinch their second ICC Men's T20 World Cup title.
Answer: England
Classification:
[
{
"statement_1":"England won the 2022 ICC Men's T20 World Cup.",
"reason": "From the context it is clear that England defeated Pakistan to win the World Cup.",
"Attributed": "Yes"
}
]

Question: {question}
Context:{context}
Answer:{answer}
Classification:
"#
    }

    /// Prompt to regenerate a question from a given answer.
    pub fn question_generation() -> &'static str {
        r#"Generate a question for the given answer.
Answer:
The PSLV-C56 mission is scheduled to be launched on Sunday, 30 July 2023 at 06:30 IST / 01:00 UTC. It will be launched from the Satish Dhawan Space Centre, Sriharikota, Andhra Pradesh, India.
Question: When is the scheduled launch date and time for the PSLV-C56 mission, and where will it be launched from?

Answer:{answer}
Question:
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_not_empty() {
        assert!(!Prompts::statement_extraction().is_empty());
        assert!(!Prompts::nli_statements().is_empty());
        assert!(!Prompts::context_precision().is_empty());
        assert!(!Prompts::context_recall().is_empty());
        assert!(!Prompts::question_generation().is_empty());
    }

    #[test]
    fn test_placeholders_present() {
        assert!(Prompts::statement_extraction().contains("{question}"));
        assert!(Prompts::statement_extraction().contains("{answer}"));
        assert!(Prompts::nli_statements().contains("{context}"));
        assert!(Prompts::nli_statements().contains("{statements}"));
        assert!(Prompts::context_precision().contains("{question}"));
        assert!(Prompts::context_precision().contains("{context}"));
        assert!(Prompts::context_recall().contains("{answer}"));
        assert!(Prompts::question_generation().contains("{answer}"));
    }
}
