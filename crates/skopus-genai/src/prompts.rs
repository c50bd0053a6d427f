//! Prompt templates sent to the generative service.
//!
//! Prompts are written in Brazilian Portuguese because the generated leads,
//! messages and contracts are consumed in that language.

use skopus_core::{ContractInput, CopyInput, LocationDescriptor, Tone};

/// Prompt asking for one page of real establishments in `location`.
#[must_use]
pub fn lead_search(niche: &str, location: &LocationDescriptor, page: u32) -> String {
    format!(
        "INTELIGÊNCIA SDR: PESQUISA DE MERCADO COM DADOS REAIS (GOOGLE SEARCH)\n\
         Localização da busca: {location}\n\
         Nicho/Mercado: {niche}\n\
         Página de resultados: {page}\n\
         \n\
         Atue como um motor de busca de leads. Pesquise no Google Maps e no Instagram \
         por empresas reais e retorne entre 25 e 30 estabelecimentos únicos nesta página, \
         diferentes dos de páginas anteriores.\n\
         \n\
         Para cada estabelecimento informe obrigatoriamente:\n\
         1. Nome oficial da empresa.\n\
         2. Descrição curta da especialidade.\n\
         3. Nota média de avaliação (0.0 a 5.0).\n\
         4. URL do perfil do Instagram e o handle (ex: @empresa).\n\
         5. Link wa.me do WhatsApp Business e o número formatado (ex: (11) 99999-9999).\n\
         6. Endereço físico completo.\n\
         \n\
         Responda APENAS com um JSON válido, sem texto explicativo.",
        niche = niche.trim(),
    )
}

/// JSON schema of a lead page in the service's schema dialect.
#[must_use]
pub fn lead_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "name": { "type": "STRING" },
                "description": { "type": "STRING" },
                "rating": { "type": "NUMBER" },
                "instagram": { "type": "STRING" },
                "instagramHandle": { "type": "STRING" },
                "whatsapp": { "type": "STRING" },
                "whatsappNumber": { "type": "STRING" },
                "address": { "type": "STRING" }
            },
            "required": [
                "id", "name", "address", "whatsapp",
                "instagram", "instagramHandle", "whatsappNumber"
            ]
        }
    })
}

/// Prompt for two outreach message options separated by `[DIVIDER]`.
#[must_use]
pub fn copy_draft(input: &CopyInput) -> String {
    format!(
        "Atue como um Copywriter Sênior especializado em resposta direta e neuromarketing.\n\
         Escreva DUAS opções de mensagem de prospecção comercial persuasivas, humanas e naturais.\n\
         \n\
         Contexto:\n\
         - Remetente: {user}\n\
         - Nicho/Mercado: {niche}\n\
         - Nome do lead: {contact}\n\
         - Dor do lead: {problem}\n\
         - Solução proposta: {solution}\n\
         - Diferencial competitivo: {differential}\n\
         - Objetivo final: {goal}\n\
         - Tom de voz: {tone}\n\
         \n\
         Regras:\n\
         1. Mensagens curtas e diretas, sem clichês de vendas.\n\
         2. O foco é iniciar uma conversa.\n\
         3. NÃO use asteriscos (**) para negrito.\n\
         4. Separe as duas opções com a marcação exata: {divider}",
        user = input.user_name.trim(),
        niche = input.niche.trim(),
        contact = input.contact_name.trim(),
        problem = input.lead_problem.trim(),
        solution = input.solution.trim(),
        differential = input.differential.trim(),
        goal = input.goal.trim(),
        tone = tone_label(input.tone),
        divider = skopus_core::text::COPY_DIVIDER,
    )
}

/// Prompt for a ready-to-sign service contract with numbered clauses.
#[must_use]
pub fn contract_draft(input: &ContractInput) -> String {
    let delay_fine = if input.delay_fine { "Mora de 2%" } else { "Isento" };
    let default_fine = if input.default_fine {
        "Rescisória de 20%"
    } else {
        "Isento"
    };

    format!(
        "Atue como especialista em Legal Design e Direito Civil brasileiro.\n\
         Redija um CONTRATO DE PRESTAÇÃO DE SERVIÇOS pronto para uso.\n\
         \n\
         Regras de saída:\n\
         - NÃO use hashtags (#), emojis ou comentários sobre o texto.\n\
         - NÃO use títulos em Markdown. Escreva os nomes das cláusulas em CAIXA ALTA.\n\
         - NÃO inclua introduções nem conclusões; comece diretamente pelo título do contrato.\n\
         - Use negrito (**) APENAS para termos definidos e valores importantes.\n\
         - Linguagem profissional e objetiva, sem juridiquês arcaico.\n\
         - Antes das assinaturas, informe o local e a data fornecidos.\n\
         \n\
         Dados:\n\
         - Serviço: {service}\n\
         - Contratada: {provider} (ID: {provider_id})\n\
         - Contratante: {client} (ID: {client_id})\n\
         - Valor: R$ {value}\n\
         - Prazo: {deadline} dias\n\
         - Local: {location}\n\
         - Data: {date}\n\
         - Multas: {delay_fine} e {default_fine}\n\
         - Extras: {extras}\n\
         \n\
         Estruture o contrato em CLÁUSULAS numeradas.",
        service = input.service_name.trim(),
        provider = input.provider_name.trim(),
        provider_id = input.provider_id.trim(),
        client = input.client_name.trim(),
        client_id = input.client_id.trim(),
        value = input.value.trim(),
        deadline = input.deadline.trim(),
        location = input.location.trim(),
        date = input.date.trim(),
        extras = input.extra_info().unwrap_or("Nenhum"),
    )
}

fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "formal",
        Tone::Casual => "casual",
        Tone::Objective => "direto e objetivo",
    }
}
