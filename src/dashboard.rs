use crate::handlers::AppState;
use axum::{extract::State, response::Html};
use std::sync::Arc;

/// Serves the single-page dashboard.
///
/// The page reads the chosen file as a `data:` URL and posts it, with the
/// selected year and month, to the report endpoints. Every control change
/// re-sends the file; the server keeps nothing between requests.
pub async fn serve_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_dashboard(state.config.default_year))
}

/// The page with its year input preset to `default_year`.
fn render_dashboard(default_year: i32) -> String {
    DASHBOARD_HTML.replace("{{default_year}}", &default_year.to_string())
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lead Report</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        body { font-family: sans-serif; margin: 2rem; }
        .upload { width: 50%; margin: 10px auto; padding: 18px; border: 1px dashed #888; border-radius: 5px; text-align: center; }
        .controls { display: flex; gap: 1rem; margin: 1.5rem 0; }
        table { border-collapse: collapse; font-size: 0.85rem; }
        th, td { border: 1px solid #ccc; padding: 4px 6px; min-width: 95px; max-width: 95px; white-space: normal; }
        .grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; }
        .error { color: #b00020; }
    </style>
</head>
<body>
    <div class="upload"><input type="file" id="upload" accept=".xlsx,.xls,.ods,.csv"></div>
    <div class="controls">
        <input type="number" id="year" value="{{default_year}}" placeholder="Enter year">
        <select id="month">
            <option value="">Select a month...</option>
            <option value="01">January</option><option value="02">February</option>
            <option value="03">March</option><option value="04">April</option>
            <option value="05">May</option><option value="06">June</option>
            <option value="07">July</option><option value="08">August</option>
            <option value="09">September</option><option value="10">October</option>
            <option value="11">November</option><option value="12">December</option>
        </select>
    </div>
    <p id="status"></p>
    <div id="table"></div>
    <div id="pager"></div>
    <p>
        <button id="duplicates-button">View duplicate records</button>
        <button id="missing-owner-button">Download missing Contact Owner records</button>
    </p>
    <div id="duplicates"></div>
    <div id="missing-owner"></div>
    <div id="country-map"></div>
    <div class="grid" id="charts"></div>
    <script>
        let contents = null;
        let filename = null;
        let page = 0;

        const query = (extra = {}) => {
            const params = new URLSearchParams();
            const year = document.getElementById('year').value;
            const month = document.getElementById('month').value;
            if (year) params.set('year', year);
            if (month) params.set('month', month);
            for (const [k, v] of Object.entries(extra)) params.set(k, v);
            return params.toString();
        };

        const post = async (path, extra) => {
            const response = await fetch(`${path}?${query(extra)}`, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ contents, filename }),
            });
            if (!response.ok) {
                const body = await response.json().catch(() => ({ error: response.statusText }));
                throw new Error(body.error);
            }
            return response;
        };

        const escapeHtml = (value) => String(value ?? '')
            .replace(/&/g, '&amp;')
            .replace(/</g, '&lt;')
            .replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;');

        const renderTable = (columns, rows) => {
            const head = columns.map(c => `<th>${escapeHtml(c.name ?? c)}</th>`).join('');
            const body = rows.map(r => `<tr>${r.map(v => `<td>${escapeHtml(v)}</td>`).join('')}</tr>`).join('');
            return `<table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>`;
        };

        const setStatus = (text, isError = false) => {
            const el = document.getElementById('status');
            el.textContent = text;
            el.className = isError ? 'error' : '';
        };

        async function loadTable() {
            const data = await (await post('/api/v1/reports/table', { page })).json();
            document.getElementById('table').innerHTML = renderTable(data.columns, data.rows);
            document.getElementById('pager').innerHTML =
                `<button ${page === 0 ? 'disabled' : ''} onclick="page--; refresh()">Prev</button>
                 page ${data.total_pages === 0 ? 0 : page + 1} of ${data.total_pages}
                 <button ${page + 1 >= data.total_pages ? 'disabled' : ''} onclick="page++; refresh()">Next</button>`;
            setStatus(`${data.meta.filtered_rows} of ${data.meta.total_rows} leads`);
        }

        async function loadCharts() {
            const data = await (await post('/api/v1/reports/dashboard')).json();
            Plotly.newPlot('country-map', data.country_map.figure.data, data.country_map.figure.layout);
            const charts = document.getElementById('charts');
            charts.innerHTML = '';
            const views = [...data.categories, data.months, data.ages];
            views.forEach((view, i) => {
                const cell = document.createElement('div');
                const plot = document.createElement('div');
                plot.id = `chart-${i}`;
                cell.appendChild(plot);
                if (view !== data.months) {
                    const label = document.createElement('div');
                    label.textContent = view.distribution.missing_label;
                    cell.appendChild(label);
                }
                charts.appendChild(cell);
                Plotly.newPlot(plot.id, view.figure.data, view.figure.layout);
            });
        }

        async function refresh() {
            if (!contents) return;
            try {
                await Promise.all([loadTable(), loadCharts()]);
            } catch (err) {
                setStatus(err.message, true);
            }
        }

        document.getElementById('upload').addEventListener('change', (event) => {
            const file = event.target.files[0];
            if (!file) return;
            const reader = new FileReader();
            reader.onload = () => { contents = reader.result; filename = file.name; page = 0; refresh(); };
            reader.readAsDataURL(file);
        });
        document.getElementById('year').addEventListener('change', () => { page = 0; refresh(); });
        document.getElementById('month').addEventListener('change', () => { page = 0; refresh(); });

        document.getElementById('duplicates-button').addEventListener('click', async () => {
            if (!contents) return;
            try {
                const data = await (await post('/api/v1/reports/duplicates')).json();
                const rows = data.records.map(r => [r.matched_on, ...r.cells]);
                document.getElementById('duplicates').innerHTML =
                    renderTable(['Matched On', ...data.columns], rows);
            } catch (err) {
                setStatus(err.message, true);
            }
        });

        document.getElementById('missing-owner-button').addEventListener('click', async () => {
            if (!contents) return;
            try {
                const data = await (await post('/api/v1/reports/missing-contact-owner')).json();
                document.getElementById('missing-owner').innerHTML = renderTable(data.columns, data.rows);
                const blob = await (await post('/api/v1/reports/missing-contact-owner/download')).blob();
                const link = document.createElement('a');
                link.href = URL.createObjectURL(blob);
                link.download = 'missing_contact_owner_records.xlsx';
                link.click();
                URL.revokeObjectURL(link.href);
            } catch (err) {
                setStatus(err.message, true);
            }
        });
    </script>
</body>
</html>
"#;
