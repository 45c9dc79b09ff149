use crate::refresh::AppContext;
use crate::server::api;
use crate::server::static_files;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
    /// Set for downloads (the CSV export) to carry the attachment name.
    pub content_disposition: Option<String>,
}

impl HttpResponse {
    pub fn json(status_code: u16, status_text: &'static str, body: String) -> HttpResponse {
        HttpResponse {
            status_code,
            status_text,
            content_type: "application/json",
            body,
            content_disposition: None,
        }
    }

    pub fn to_http_string(&self) -> String {
        let mut headers = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
        );
        if let Some(disposition) = &self.content_disposition {
            headers.push_str(&format!("Content-Disposition: {disposition}\r\n"));
        }
        format!("{headers}\r\n{}", self.body)
    }
}

pub fn route_request(ctx: &AppContext, method: &str, path: &str, body: &str) -> HttpResponse {
    if let Some(response) = static_files::try_serve_static(method, path) {
        return response;
    }
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
            content_disposition: None,
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/dashboard") => match api::dashboard_payload(ctx) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/filters/apply") => match api::apply_filters_payload(ctx, body) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(api::FilterPayloadError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid filter criteria: {err}"))
            }
            Err(api::FilterPayloadError::Render(err)) => {
                error_response(500, "Internal Server Error", &err.to_string())
            }
        },
        ("POST", "/api/filters/reset") => match api::reset_filters_payload(ctx) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/refresh") => match api::refresh_payload(ctx) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(api::RefreshPayloadError::Fetch(err)) => {
                error_response(502, "Bad Gateway", &err.to_string())
            }
            Err(api::RefreshPayloadError::Render(err)) => {
                error_response(500, "Internal Server Error", &err.to_string())
            }
        },
        ("GET", "/api/export") => match api::export_payload(ctx) {
            Ok(export) => HttpResponse {
                status_code: 200,
                status_text: "OK",
                content_type: "text/csv; charset=utf-8",
                body: export.csv,
                content_disposition: Some(format!(
                    "attachment; filename=\"{}\"",
                    export.file_name
                )),
            },
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse::json(
        status_code,
        status_text,
        format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    )
}

fn index_html() -> String {
    r##"<!doctype html>
<html lang="es">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Padrón — Tablero de Campaña</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <style>
    body { font-family: 'Segoe UI', Arial, sans-serif; max-width: 1200px; margin: 18px auto; padding: 0 12px; color: #2c3e50; }
    h1 { margin-bottom: 4px; }
    .badges { margin-bottom: 12px; }
    .badge { display: inline-block; padding: 4px 10px; border-radius: 10px; color: #fff; font-size: 13px; margin-right: 6px; }
    .badge.info { background: #3498db; } .badge.success { background: #28a745; }
    .badge.warning { background: #f39c12; } .badge.error { background: #dc3545; }
    .badge.time { background: #6c757d; }
    .stats { display: flex; gap: 10px; flex-wrap: wrap; margin: 12px 0; }
    .stat { flex: 1; min-width: 130px; border: 1px solid #ddd; border-radius: 8px; padding: 10px; text-align: center; }
    .stat .num { font-size: 26px; font-weight: 700; }
    .stat .lbl { font-size: 12px; color: #6c757d; }
    .filters { display: flex; gap: 8px; flex-wrap: wrap; align-items: end; margin: 12px 0; }
    .filters label { display: block; font-size: 12px; font-weight: 600; margin-bottom: 2px; }
    select, button { padding: 6px 10px; }
    #map { height: 380px; border: 1px solid #ddd; border-radius: 8px; margin: 12px 0; }
    .charts { display: flex; gap: 12px; flex-wrap: wrap; }
    .chart-box { flex: 1; min-width: 320px; height: 280px; border: 1px solid #ddd; border-radius: 8px; padding: 8px; }
    table { width: 100%; border-collapse: collapse; margin: 12px 0; font-size: 14px; }
    th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; }
    tbody tr { cursor: pointer; }
    tbody tr:hover { background: #f8f9fa; }
    .voto-si { color: #28a745; font-weight: 700; } .voto-no { color: #dc3545; font-weight: 700; }
  </style>
</head>
<body>
  <h1>Padrón — Tablero de Campaña</h1>
  <div class="badges">
    <span id="status-badge" class="badge info">Cargando...</span>
    <span id="update-badge" class="badge time">Sin actualizar</span>
  </div>

  <div class="stats">
    <div class="stat"><div class="num" id="stat-total">0</div><div class="lbl">Registros</div></div>
    <div class="stat"><div class="num" id="stat-lideres">0</div><div class="lbl">Líderes</div></div>
    <div class="stat"><div class="num" id="stat-ciudades">0</div><div class="lbl">Ciudades</div></div>
    <div class="stat"><div class="num" id="stat-reportados">0</div><div class="lbl">Votos reportados</div></div>
    <div class="stat"><div class="num" id="stat-porcentaje">0%</div><div class="lbl">Reportado</div></div>
  </div>

  <div class="filters">
    <div><label for="filter-ciudad">Ciudad</label><select id="filter-ciudad"></select></div>
    <div><label for="filter-lider">Líder</label><select id="filter-lider"></select></div>
    <div><label for="filter-mesa">Mesa</label><select id="filter-mesa"></select></div>
    <div><label for="filter-voto">Voto</label>
      <select id="filter-voto">
        <option value="">Todos</option>
        <option value="true">Reportado</option>
        <option value="false">No reportado</option>
      </select>
    </div>
    <button id="reset-filters">Limpiar filtros</button>
    <button id="refresh-data">Actualizar</button>
    <button id="export-data">Exportar CSV</button>
  </div>

  <div id="map"></div>

  <div class="charts">
    <div class="chart-box"><canvas id="leader-chart"></canvas></div>
    <div class="chart-box"><canvas id="city-chart"></canvas></div>
  </div>

  <table id="data-table">
    <thead></thead>
    <tbody id="table-body"></tbody>
  </table>

  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js"></script>
  <script>
    let map = null, markerLayer = null, leaderChart = null, cityChart = null;

    function initMap() {
      map = L.map('map').setView([4.5709, -74.2973], 6);
      L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        attribution: '© OpenStreetMap contributors', maxZoom: 19
      }).addTo(map);
      markerLayer = L.layerGroup().addTo(map);
    }

    function popupHtml(p) {
      const rows = [
        ['Cédula', p.cedula], ['Teléfono', p.telefono], ['Líder', p.lider],
        ['Ciudad', p.ciudad], ['Puesto', p.puestoVotacion], ['Mesa', p.mesa],
        ['Voto', p.reportoVoto ? 'REPORTADO' : 'NO REPORTADO']
      ].filter(([, v]) => v !== undefined && v !== '');
      return '<strong>' + p.label + '</strong><br/>' +
        rows.map(([k, v]) => k + ': ' + v).join('<br/>');
    }

    function renderMap(points) {
      if (!map) return;
      markerLayer.clearLayers();
      points.forEach(p => {
        L.circleMarker([p.latitud, p.longitud], {
          radius: 8, color: '#fff', weight: 2, fillColor: p.color, fillOpacity: 0.9
        }).bindPopup(popupHtml(p)).addTo(markerLayer);
      });
    }

    function focusOn(lat, lng) {
      if (map && lat && lng) map.setView([lat, lng], 15);
    }

    function renderChart(existing, canvasId, type, series, label) {
      if (existing) existing.destroy();
      return new Chart(document.getElementById(canvasId), {
        type,
        data: type === 'doughnut' ? {
          labels: series.labels,
          datasets: [{ data: series.totals }]
        } : {
          labels: series.labels,
          datasets: [
            { label: 'Reportados', data: series.reported, backgroundColor: 'rgba(40,167,69,0.7)' },
            { label: 'Totales', data: series.totals, backgroundColor: 'rgba(52,152,219,0.5)' }
          ]
        },
        options: { responsive: true, maintainAspectRatio: false }
      });
    }

    function fillSelect(id, options, current) {
      const select = document.getElementById(id);
      select.innerHTML = '<option value="">Todos</option>';
      options.forEach(o => {
        const opt = document.createElement('option');
        opt.value = o; opt.textContent = o;
        select.appendChild(opt);
      });
      if (current && options.includes(current)) select.value = current;
    }

    function renderTable(records, hasTelefono) {
      const cols = ['Líder', 'Nombre', 'Cédula'];
      if (hasTelefono) cols.push('Teléfono');
      cols.push('Ciudad', 'Puesto', 'Mesa', 'Voto');
      document.querySelector('#data-table thead').innerHTML =
        '<tr>' + cols.map(c => '<th>' + c + '</th>').join('') + '</tr>';
      const tbody = document.getElementById('table-body');
      tbody.innerHTML = '';
      records.forEach(r => {
        const tr = document.createElement('tr');
        const cells = [r.lider, (r.nombre + ' ' + r.apellidos).trim(), r.cedula];
        if (hasTelefono) cells.push(r.telefono);
        cells.push(r.ciudad, r.puestoVotacion, r.mesa,
          r.reportoVoto ? '<span class="voto-si">Sí</span>' : '<span class="voto-no">No</span>');
        tr.innerHTML = cells.map(c => '<td>' + (c || '') + '</td>').join('');
        tr.addEventListener('click', () => focusOn(r.latitud, r.longitud));
        tbody.appendChild(tr);
      });
    }

    function render(data) {
      const badge = document.getElementById('status-badge');
      badge.textContent = data.status.message;
      badge.className = 'badge ' + data.status.level;
      document.getElementById('update-badge').textContent =
        data.status.lastUpdate ? new Date(data.status.lastUpdate).toLocaleTimeString('es-ES') : 'Sin actualizar';

      document.getElementById('stat-total').textContent = data.stats.total;
      document.getElementById('stat-lideres').textContent = data.stats.lideres;
      document.getElementById('stat-ciudades').textContent = data.stats.ciudades;
      document.getElementById('stat-reportados').textContent = data.stats.reportados;
      document.getElementById('stat-porcentaje').textContent = data.stats.porcentajeReportado + '%';

      fillSelect('filter-ciudad', data.filters.ciudades, data.criteria.ciudad);
      fillSelect('filter-lider', data.filters.lideres, data.criteria.lider);
      fillSelect('filter-mesa', data.filters.mesas, data.criteria.mesa);

      renderMap(data.mapPoints);
      leaderChart = renderChart(leaderChart, 'leader-chart', 'doughnut', data.leaderChart);
      cityChart = renderChart(cityChart, 'city-chart', 'bar', data.cityChart);
      renderTable(data.records, data.hasTelefono);
    }

    async function loadDashboard() {
      const response = await fetch('/api/dashboard');
      if (response.ok) render(await response.json());
    }

    function criteriaFromForm() {
      const voto = document.getElementById('filter-voto').value;
      return {
        ciudad: document.getElementById('filter-ciudad').value,
        lider: document.getElementById('filter-lider').value,
        mesa: document.getElementById('filter-mesa').value,
        reportoVoto: voto === '' ? null : voto === 'true'
      };
    }

    async function applyFilters() {
      const response = await fetch('/api/filters/apply', {
        method: 'POST', body: JSON.stringify(criteriaFromForm())
      });
      if (response.ok) render(await response.json());
    }

    ['filter-ciudad', 'filter-lider', 'filter-mesa', 'filter-voto'].forEach(id =>
      document.getElementById(id).addEventListener('change', applyFilters));
    document.getElementById('reset-filters').addEventListener('click', async () => {
      const response = await fetch('/api/filters/reset', { method: 'POST' });
      if (response.ok) render(await response.json());
    });
    document.getElementById('refresh-data').addEventListener('click', async () => {
      const response = await fetch('/api/refresh', { method: 'POST' });
      if (response.ok) render(await response.json()); else loadDashboard();
    });
    document.getElementById('export-data').addEventListener('click', () => {
      window.location = '/api/export';
    });

    initMap();
    loadDashboard();
    setInterval(loadDashboard, 15000);
  </script>
</body>
</html>
"##
    .to_string()
}
